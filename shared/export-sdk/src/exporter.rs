//! Export orchestration
//!
//! Every update runs the same sequence on its own:
//! validate config -> extract -> canonicalize -> sign -> send -> report.
//! Overlapping updates are neither merged nor ordered; each export signs its
//! own snapshot and the status surface keeps whichever result lands last.

use export_core::{ExportConfig, TableSnapshot};
use export_telemetry::ExportMetrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::canonical::{build_payload, canonicalize, SignedMessage};
use crate::error::ExportFailure;
use crate::extractor::extract_record;
use crate::signer::{HmacSha256Signer, MessageSigner};
use crate::status::{ExportStatus, StatusSink};
use crate::stream::{UpdateEvent, UpdateStream};
use crate::transport::{IngestRequest, IngestTransport};

/// Step at which an export failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Building,
    Signing,
    Sending,
}

impl ExportStage {
    fn of(failure: &ExportFailure) -> Self {
        match failure {
            ExportFailure::Canonical(_) => Self::Building,
            ExportFailure::Signing(_) => Self::Signing,
            ExportFailure::Transport(_) => Self::Sending,
        }
    }
}

/// Terminal state of one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    ConfigMissing,
    Exported { signature: String, response_status: u16 },
    Failed { stage: ExportStage },
}

impl ExportOutcome {
    pub fn status(&self) -> ExportStatus {
        match self {
            Self::ConfigMissing => ExportStatus::ConfigMissing,
            Self::Exported { .. } => ExportStatus::Exported,
            Self::Failed { .. } => ExportStatus::Failed,
        }
    }
}

pub struct Exporter {
    signer: Arc<dyn MessageSigner>,
    transport: Arc<dyn IngestTransport>,
    status: Arc<dyn StatusSink>,
    metrics: ExportMetrics,
}

impl Exporter {
    pub fn new(transport: Arc<dyn IngestTransport>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            signer: Arc::new(HmacSha256Signer),
            transport,
            status,
            metrics: ExportMetrics::new(),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn MessageSigner>) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_metrics(mut self, metrics: ExportMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &ExportMetrics {
        &self.metrics
    }

    /// Export one snapshot. Never fails: every path ends in a reported status.
    pub async fn on_update(
        &self,
        snapshot: &TableSnapshot,
        config: &ExportConfig,
        page_id: &str,
    ) -> ExportOutcome {
        let outcome = if let Err(e) = config.validate() {
            debug!(page_id, error = %e, "Export skipped");
            self.metrics.skipped_config.inc();
            ExportOutcome::ConfigMissing
        } else {
            self.metrics.attempted.inc();
            self.metrics.in_flight.inc();
            let result = self.export(snapshot, config, page_id).await;
            self.metrics.in_flight.dec();

            match result {
                Ok((signature, response_status)) => {
                    self.metrics.succeeded.inc();
                    info!(
                        report_id = %config.report_id,
                        page_id,
                        response_status,
                        "Snapshot exported"
                    );
                    ExportOutcome::Exported { signature, response_status }
                }
                Err(failure) => {
                    let stage = ExportStage::of(&failure);
                    self.metrics.failed.inc();
                    warn!(
                        report_id = %config.report_id,
                        page_id,
                        stage = ?stage,
                        error = %failure,
                        "Snapshot export failed"
                    );
                    ExportOutcome::Failed { stage }
                }
            }
        };

        self.status.report(outcome.status());
        outcome
    }

    async fn export(
        &self,
        snapshot: &TableSnapshot,
        config: &ExportConfig,
        page_id: &str,
    ) -> Result<(String, u16), ExportFailure> {
        let record = extract_record(snapshot);
        let payload = build_payload(record, &config.report_id, page_id);
        let body = canonicalize(&payload)?;

        let signature = self.signer.sign(&config.shared_secret, &body).await?;
        let message = SignedMessage::new(body, signature);
        debug!(
            fields = payload.fields.len(),
            tool = %payload.tool,
            algorithm = self.signer.algorithm(),
            "Export payload signed"
        );

        let (body, signature) = message.into_parts();
        let started = Instant::now();
        let response = self
            .transport
            .post(IngestRequest {
                url: config.ingest_url.clone(),
                body,
                signature: signature.clone(),
            })
            .await?;
        self.metrics
            .send_latency_ms
            .record(started.elapsed().as_secs_f64() * 1000.0);

        Ok((signature, response.status))
    }

    /// Consume `stream`, exporting every event on its own task.
    ///
    /// The returned task ends after the stream closes and the exports it
    /// started have finished.
    pub fn subscribe(self: Arc<Self>, mut stream: UpdateStream) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut exports = JoinSet::new();

            while let Some(event) = stream.next().await {
                let exporter = self.clone();
                exports.spawn(async move {
                    let UpdateEvent { snapshot, config, page_id } = event;
                    exporter.on_update(&snapshot, &config, &page_id).await
                });

                while let Some(done) = exports.try_join_next() {
                    if let Err(e) = done {
                        warn!("Export task aborted: {}", e);
                    }
                }
            }

            while let Some(done) = exports.join_next().await {
                if let Err(e) = done {
                    warn!("Export task aborted: {}", e);
                }
            }

            info!("Update stream closed");
        })
    }
}
