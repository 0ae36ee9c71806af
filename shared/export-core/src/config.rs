//! Configuration management for export services

use crate::domain::ExportConfig;
use crate::error::{ExportError, Result};
use std::env;
use std::fmt;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_name: String,
    pub http_bind: String,
    pub log_level: String,
    pub update_queue_capacity: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "report-exporter".to_string()),
            http_bind: env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            update_queue_capacity: env::var("UPDATE_QUEUE_CAPACITY")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .map_err(|e| ExportError::Config(format!("Invalid UPDATE_QUEUE_CAPACITY: {}", e)))?,
        })
    }
}

/// Fallback export settings for values the host style leaves empty
#[derive(Clone, Default)]
pub struct ExportDefaults {
    pub ingest_url: Option<String>,
    pub shared_secret: Option<String>,
    pub report_id: Option<String>,
}

impl ExportDefaults {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            ingest_url: non_empty("EXPORT_INGEST_URL"),
            shared_secret: non_empty("EXPORT_SHARED_SECRET"),
            report_id: non_empty("EXPORT_REPORT_ID"),
        }
    }

    /// Fill every empty value of `config` from these defaults
    pub fn apply(&self, mut config: ExportConfig) -> ExportConfig {
        fill(&mut config.ingest_url, &self.ingest_url);
        fill(&mut config.shared_secret, &self.shared_secret);
        fill(&mut config.report_id, &self.report_id);
        config
    }
}

fn fill(target: &mut String, fallback: &Option<String>) {
    if target.is_empty() {
        if let Some(value) = fallback {
            target.clone_from(value);
        }
    }
}

impl fmt::Debug for ExportDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportDefaults")
            .field("ingest_url", &self.ingest_url)
            .field("shared_secret", &self.shared_secret.as_ref().map(|_| "[REDACTED]"))
            .field("report_id", &self.report_id)
            .finish()
    }
}
