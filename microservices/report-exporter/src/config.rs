//! Configuration for the Report Exporter service

use export_core::{ExportDefaults, Result, ServiceConfig};
use export_sdk::TransportConfig;

/// Report Exporter configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address, queue size and logging
    pub service: ServiceConfig,
    /// Outbound HTTP client settings
    pub transport: TransportConfig,
    /// Fallbacks for export settings the host style leaves empty
    pub defaults: ExportDefaults,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            service: ServiceConfig::from_env()?,
            transport: TransportConfig::from_env()?,
            defaults: ExportDefaults::from_env(),
        })
    }
}
