//! Ingest transport
//!
//! Delivery of a signed body to the ingest endpoint. The exporter only needs
//! to know whether the request completed, so the response body is never read.

use async_trait::async_trait;
use export_core::{ExportError, Result};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use crate::error::TransportError;

/// Header carrying the hex HMAC of the request body
pub const SIGNATURE_HEADER: &str = "X-Signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub url: String,
    pub body: Vec<u8>,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestResponse {
    pub status: u16,
}

impl IngestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// POSTs signed bodies to an ingest endpoint
#[async_trait]
pub trait IngestTransport: Send + Sync {
    async fn post(&self, request: IngestRequest) -> std::result::Result<IngestResponse, TransportError>;
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// No timeout when unset
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: concat!("report-exporter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    pub fn from_env() -> Result<Self> {
        let timeout = match std::env::var("EXPORT_HTTP_TIMEOUT_SECS") {
            Ok(secs) if !secs.is_empty() => Some(Duration::from_secs(secs.parse().map_err(|e| {
                ExportError::Config(format!("Invalid EXPORT_HTTP_TIMEOUT_SECS: {}", e))
            })?)),
            _ => None,
        };

        Ok(Self {
            timeout,
            user_agent: std::env::var("EXPORT_USER_AGENT")
                .unwrap_or_else(|_| Self::default().user_agent),
        })
    }
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> std::result::Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl IngestTransport for ReqwestTransport {
    async fn post(&self, request: IngestRequest) -> std::result::Result<IngestResponse, TransportError> {
        let body_len = request.body.len();

        let response = self.http_client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, request.signature)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), body_len, "Ingest request delivered");
        } else {
            tracing::warn!(status = status.as_u16(), body_len, "Ingest endpoint returned non-success status");
        }

        Ok(IngestResponse { status: status.as_u16() })
    }
}
