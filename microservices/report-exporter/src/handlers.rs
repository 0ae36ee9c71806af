//! HTTP handlers for the Report Exporter API

use axum::{extract::State, http::StatusCode, Json};
use export_sdk::{HostUpdate, StatusEntry};
use export_telemetry::MetricsSnapshot;
use serde::Serialize;

use crate::error::Result;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Ready check response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub update_stream: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "report-exporter".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let update_stream = !state.publisher.is_closed();
    let code = if update_stream {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(ReadyResponse { ready: update_stream, update_stream }))
}

/// Queue one host update for export
pub async fn publish_update(
    State(state): State<AppState>,
    Json(update): Json<HostUpdate>,
) -> Result<StatusCode> {
    let event = update.into_event(&state.defaults);
    tracing::debug!(
        page_id = %event.page_id,
        rows = event.snapshot.tables.default.len(),
        "Host update received"
    );

    state.publisher.publish(event).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn status(State(state): State<AppState>) -> Json<Option<StatusEntry>> {
    Json(state.status.latest())
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use export_core::ExportDefaults;
    use export_sdk::{update_channel, StatusBoard};
    use export_telemetry::ExportMetrics;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Instant;

    fn state(capacity: usize) -> (AppState, export_sdk::UpdateStream) {
        let (publisher, stream) = update_channel(capacity);
        let state = AppState {
            publisher,
            defaults: Arc::new(ExportDefaults::default()),
            status: StatusBoard::new(),
            metrics: ExportMetrics::new(),
            start_time: Instant::now(),
        };
        (state, stream)
    }

    #[tokio::test]
    async fn test_publish_update_queues_event() {
        let (state, mut stream) = state(4);
        let update: HostUpdate = serde_json::from_value(json!({
            "fields": { "dimensions": [{ "name": "Tool" }] },
            "tables": { "DEFAULT": [[{ "v": "Zapier" }]] },
            "style": { "ingestUrl": "https://example.test/ingest", "sharedSecret": "s3cr3t" },
            "themeId": "p1"
        }))
        .unwrap();

        let code = publish_update(State(state), Json(update)).await.unwrap();
        assert_eq!(code, StatusCode::ACCEPTED);

        let event = stream.next().await.unwrap();
        assert_eq!(event.page_id, "p1");
        assert!(event.config.is_complete());
    }

    #[tokio::test]
    async fn test_empty_style_reaches_network_only_with_env_defaults() {
        let update = || -> HostUpdate {
            serde_json::from_value(json!({ "style": {}, "themeId": "p1" })).unwrap()
        };

        let (style_only, mut stream) = state(4);
        tokio_test::assert_ok!(publish_update(State(style_only), Json(update())).await);
        let event = stream.next().await.unwrap();
        assert!(event.config.validate().is_err());

        let (mut with_defaults, mut stream) = state(4);
        with_defaults.defaults = Arc::new(ExportDefaults {
            ingest_url: Some("https://fallback.test/ingest".into()),
            shared_secret: Some("fallback-secret".into()),
            report_id: None,
        });
        tokio_test::assert_ok!(publish_update(State(with_defaults), Json(update())).await);
        let event = stream.next().await.unwrap();
        assert!(event.config.validate().is_ok());
        assert_eq!(event.config.ingest_url, "https://fallback.test/ingest");
    }

    #[tokio::test]
    async fn test_publish_update_fails_when_stream_closed() {
        let (state, stream) = state(1);
        drop(stream);

        let err = publish_update(State(state), Json(HostUpdate::default()))
            .await
            .unwrap_err();
        assert_eq!(err.0.error_code(), "UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_ready_tracks_update_stream() {
        let (state, stream) = state(1);
        let (code, Json(body)) = ready(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);
        assert!(body.ready);

        drop(stream);
        let (code, _) = ready(State(state)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_status_starts_empty() {
        let (state, _stream) = state(1);
        let Json(latest) = status(State(state.clone())).await;
        assert!(latest.is_none());

        use export_sdk::StatusSink;
        state.status.report(export_sdk::ExportStatus::Exported);
        let Json(latest) = status(State(state)).await;
        assert_eq!(latest.unwrap().status, "Exported snapshot");
    }
}
