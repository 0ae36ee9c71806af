//! Export Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Tabular snapshot and record types exchanged with the host
//! - Export configuration and its environment defaults
//! - Error handling utilities
//! - Service lifecycle trait and runtime bootstrap

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::{ExportDefaults, ServiceConfig};
pub use domain::*;
pub use error::{ExportError, Result};
pub use service::{DependencyStatus, ExportService, HealthStatus, ReadinessStatus, ServiceRuntime};
