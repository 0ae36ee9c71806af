//! HTTP error mapping for the Report Exporter API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use export_core::ExportError;
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ExportError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!("Internal error: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.0.error_code()
        }));

        (status, body).into_response()
    }
}
