//! Report Exporter Service
//!
//! Receives report update notifications from the reporting host and exports
//! the current record of each one to a signed ingest endpoint:
//! - First-row record extraction and canonical JSON payloads
//! - HMAC-SHA256 `X-Signature` header with the shared secret
//! - Last-writer-wins export status board
//! - Export metrics

mod config;
mod error;
mod handlers;
mod routes;

use export_core::{
    DependencyStatus, ExportDefaults, ExportError, ExportService, HealthStatus, ReadinessStatus,
    Result, ServiceRuntime,
};
use export_sdk::{
    update_channel, Exporter, FanoutSink, ReqwestTransport, StatusBoard, TracingStatusSink,
    UpdatePublisher, UpdateStream,
};
use export_telemetry::ExportMetrics;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub publisher: UpdatePublisher,
    pub defaults: Arc<ExportDefaults>,
    pub status: StatusBoard,
    pub metrics: ExportMetrics,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    export_telemetry::init("report-exporter")?;

    info!("Starting Report Exporter");

    let config = Config::from_env()?;
    let runtime = ServiceRuntime::new(config.service.clone());
    let service = Arc::new(ReportExporterService::new(config)?);

    runtime.run(service).await?;
    Ok(())
}

pub struct ReportExporterService {
    config: Config,
    state: AppState,
    exporter: Arc<Exporter>,
    stream: Mutex<Option<UpdateStream>>,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl ReportExporterService {
    pub fn new(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.transport)?;
        let status = StatusBoard::new();
        let metrics = ExportMetrics::new();

        let sink = FanoutSink::new()
            .with(Arc::new(status.clone()))
            .with(Arc::new(TracingStatusSink));
        let exporter = Exporter::new(Arc::new(transport), Arc::new(sink))
            .with_metrics(metrics.clone());

        let (publisher, stream) = update_channel(config.service.update_queue_capacity);
        info!(
            queue_capacity = config.service.update_queue_capacity,
            timeout = ?config.transport.timeout,
            defaults = ?config.defaults,
            "Exporter initialized"
        );

        Ok(Self {
            state: AppState {
                publisher,
                defaults: Arc::new(config.defaults.clone()),
                status,
                metrics,
                start_time: Instant::now(),
            },
            config,
            exporter: Arc::new(exporter),
            stream: Mutex::new(Some(stream)),
            subscription: Mutex::new(None),
        })
    }

    pub fn router(&self) -> axum::Router {
        routes::create_router(self.state.clone())
    }

    /// Register the exporter as the update stream's handler. Only the first
    /// call subscribes.
    fn subscribe(&self) -> bool {
        let Some(stream) = self.stream.lock().take() else {
            return false;
        };
        let handle = self.exporter.clone().subscribe(stream);
        *self.subscription.lock() = Some(handle);
        true
    }
}

#[async_trait::async_trait]
impl ExportService for ReportExporterService {
    fn service_id(&self) -> &'static str { "report-exporter" }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.state.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        let update_stream = !self.state.publisher.is_closed();
        ReadinessStatus {
            ready: update_stream,
            dependencies: vec![DependencyStatus {
                name: "update-stream".to_string(),
                available: update_stream,
                latency_ms: None,
            }],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!(
            in_flight = self.state.metrics.in_flight.get(),
            "Shutting down Report Exporter"
        );
        if let Some(handle) = self.subscription.lock().take() {
            handle.abort();
        }
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if !self.subscribe() {
            return Err(ExportError::Internal("update stream already subscribed".into()));
        }

        let http_bind = &self.config.service.http_bind;
        info!(bind = %http_bind, "Starting Report Exporter HTTP server");

        let listener = TcpListener::bind(http_bind).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
