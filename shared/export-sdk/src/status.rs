//! Export status surface
//!
//! Statuses are advisory text for whoever watches the report. Failures are
//! deliberately reported with one fixed message; details only go to logs.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    ConfigMissing,
    Exported,
    Failed,
}

impl ExportStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "Configure ingestUrl & sharedSecret in Style",
            Self::Exported => "Exported snapshot",
            Self::Failed => "Export failed (check URL/secret)",
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives the terminal status of every export
pub trait StatusSink: Send + Sync {
    fn report(&self, status: ExportStatus);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

/// Holds the most recent status. Concurrent exports overwrite each other.
#[derive(Clone, Default)]
pub struct StatusBoard {
    latest: Arc<RwLock<Option<StatusEntry>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<StatusEntry> {
        self.latest.read().clone()
    }

    pub fn message(&self) -> Option<String> {
        self.latest.read().as_ref().map(|e| e.status.clone())
    }
}

impl StatusSink for StatusBoard {
    fn report(&self, status: ExportStatus) {
        *self.latest.write() = Some(StatusEntry {
            status: status.message().to_string(),
            updated_at: Utc::now(),
        });
    }
}

/// Mirrors statuses into the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn report(&self, status: ExportStatus) {
        tracing::info!(status = ?status, message = status.message(), "Export status");
    }
}

/// Reports to every inner sink in order
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn StatusSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl StatusSink for FanoutSink {
    fn report(&self, status: ExportStatus) {
        for sink in &self.sinks {
            sink.report(status);
        }
    }
}
