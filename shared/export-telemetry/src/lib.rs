//! Export Telemetry
//!
//! Structured logging setup and in-process export metrics.

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{Counter, ExportMetrics, Gauge, Histogram, MetricsSnapshot};
pub use tracing_setup::init_tracing;

/// Initialize telemetry for a service from the environment
pub fn init(service_name: &str) -> Result<(), TelemetryError> {
    let config = TelemetryConfig::from_env();
    init_tracing(service_name, &config)
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}
