//! Router configuration for the Report Exporter API

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        // Host updates
        .route("/v1/updates", post(handlers::publish_update))
        // Export status & metrics
        .route("/v1/status", get(handlers::status))
        .route("/v1/metrics", get(handlers::metrics))
        .with_state(state)
}
