//! Tests for the export pipeline

use async_trait::async_trait;
use export_core::{Cell, ExportConfig, FieldDescriptor, Row, TableSnapshot};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{SigningError, TransportError};
use crate::exporter::{ExportOutcome, ExportStage, Exporter};
use crate::signer::{sign, MessageSigner};
use crate::status::{StatusBoard, StatusSink};
use crate::stream::{update_channel, UpdateEvent};
use crate::transport::{IngestRequest, IngestResponse, IngestTransport};

const EXPORTED: &str = "Exported snapshot";
const FAILED: &str = "Export failed (check URL/secret)";
const CONFIGURE: &str = "Configure ingestUrl & sharedSecret in Style";

#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<IngestRequest>>,
    status: u16,
}

impl RecordingTransport {
    fn with_status(status: u16) -> Self {
        Self { requests: Mutex::new(Vec::new()), status }
    }

    fn requests(&self) -> Vec<IngestRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl IngestTransport for RecordingTransport {
    async fn post(&self, request: IngestRequest) -> Result<IngestResponse, TransportError> {
        self.requests.lock().push(request);
        Ok(IngestResponse { status: self.status })
    }
}

struct FailingTransport(fn() -> TransportError);

#[async_trait]
impl IngestTransport for FailingTransport {
    async fn post(&self, _request: IngestRequest) -> Result<IngestResponse, TransportError> {
        Err((self.0)())
    }
}

/// Holds requests for the `held` tool until any other request is delivered
struct GatedTransport {
    held: &'static str,
    gate: tokio::sync::Notify,
    calls: AtomicUsize,
    delivered: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl IngestTransport for GatedTransport {
    async fn post(&self, request: IngestRequest) -> Result<IngestResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = String::from_utf8_lossy(&request.body).into_owned();
        if body.contains(&format!(r#""tool":"{}""#, self.held)) {
            self.gate.notified().await;
        } else {
            self.gate.notify_one();
        }
        self.delivered.lock().push(request.body);
        Ok(IngestResponse { status: 200 })
    }
}

struct BrokenSigner;

#[async_trait]
impl MessageSigner for BrokenSigner {
    fn algorithm(&self) -> &'static str {
        "broken"
    }

    async fn sign(&self, _secret: &str, _message: &[u8]) -> Result<String, SigningError> {
        Err(SigningError::Unavailable("no crypto backend".into()))
    }
}

struct FixedSigner;

#[async_trait]
impl MessageSigner for FixedSigner {
    fn algorithm(&self) -> &'static str {
        "fixed"
    }

    async fn sign(&self, _secret: &str, _message: &[u8]) -> Result<String, SigningError> {
        Ok("0".repeat(64))
    }
}

fn tool_snapshot(tool: &str) -> TableSnapshot {
    TableSnapshot::new(
        vec![FieldDescriptor::new("Tool")],
        vec![],
        vec![Row::new([Cell::new(tool)])],
    )
}

fn config() -> ExportConfig {
    ExportConfig::new("https://example.test/ingest", "s3cr3t", "r1")
}

fn exporter(transport: Arc<dyn IngestTransport>) -> (Exporter, StatusBoard) {
    let board = StatusBoard::new();
    let exporter = Exporter::new(transport, Arc::new(board.clone()));
    (exporter, board)
}

mod exporter_tests {
    use super::*;

    #[tokio::test]
    async fn test_end_to_end_example() {
        let transport = Arc::new(RecordingTransport::with_status(200));
        let (exporter, board) = exporter(transport.clone());

        let outcome = exporter.on_update(&tool_snapshot("Zapier"), &config(), "p1").await;

        let expected_body =
            br#"{"report_id":"r1","page_id":"p1","tool":"Zapier","fields":{"Tool":"Zapier"}}"#;
        let expected_sig = "b740170079b57f2ffeca195733ee7e719252aebb914eec2627e654ae22964c89";

        assert_eq!(
            outcome,
            ExportOutcome::Exported {
                signature: expected_sig.to_string(),
                response_status: 200
            }
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://example.test/ingest");
        assert_eq!(requests[0].body, expected_body.to_vec());
        assert_eq!(requests[0].signature, expected_sig);
        assert_eq!(requests[0].signature, sign("s3cr3t", &requests[0].body).unwrap());
        assert_eq!(board.message().as_deref(), Some(EXPORTED));
    }

    #[tokio::test]
    async fn test_missing_url_or_secret_skips_network() {
        let transport = Arc::new(RecordingTransport::with_status(200));
        let (exporter, board) = exporter(transport.clone());

        for config in [
            ExportConfig::new("", "s3cr3t", "r1"),
            ExportConfig::new("https://example.test/ingest", "", "r1"),
            ExportConfig::default(),
        ] {
            let outcome = exporter.on_update(&tool_snapshot("Zapier"), &config, "p1").await;
            assert_eq!(outcome, ExportOutcome::ConfigMissing);
        }

        assert!(transport.requests().is_empty());
        assert_eq!(board.message().as_deref(), Some(CONFIGURE));
        assert_eq!(exporter.metrics().skipped_config.get(), 3);
        assert_eq!(exporter.metrics().attempted.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_report_id_still_exports() {
        let transport = Arc::new(RecordingTransport::with_status(200));
        let (exporter, _board) = exporter(transport.clone());

        let config = ExportConfig::new("https://example.test/ingest", "s3cr3t", "");
        let outcome = exporter.on_update(&tool_snapshot("Zapier"), &config, "").await;

        assert_eq!(outcome.status(), crate::ExportStatus::Exported);
        assert!(transport.requests()[0].body.starts_with(br#"{"report_id":"","page_id":"""#));
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_exported_as_empty_record() {
        let transport = Arc::new(RecordingTransport::with_status(200));
        let (exporter, board) = exporter(transport.clone());

        let outcome = exporter.on_update(&TableSnapshot::default(), &config(), "p1").await;

        assert!(matches!(outcome, ExportOutcome::Exported { .. }));
        assert_eq!(
            transport.requests()[0].body,
            br#"{"report_id":"r1","page_id":"p1","tool":"","fields":{}}"#.to_vec()
        );
        assert_eq!(board.message().as_deref(), Some(EXPORTED));
    }

    #[tokio::test]
    async fn test_network_errors_collapse_to_one_status() {
        let failures: [fn() -> TransportError; 3] = [
            || TransportError::Request("connection refused".into()),
            || TransportError::Timeout("deadline elapsed".into()),
            || TransportError::InvalidUrl("relative URL without a base".into()),
        ];

        for failure in failures {
            let (exporter, board) = exporter(Arc::new(FailingTransport(failure)));
            let outcome = exporter.on_update(&tool_snapshot("Zapier"), &config(), "p1").await;

            assert_eq!(outcome, ExportOutcome::Failed { stage: ExportStage::Sending });
            assert_eq!(board.message().as_deref(), Some(FAILED));
            assert_eq!(exporter.metrics().failed.get(), 1);
            assert_eq!(exporter.metrics().in_flight.get(), 0);
        }
    }

    #[tokio::test]
    async fn test_signing_error_collapses_and_skips_send() {
        let transport = Arc::new(RecordingTransport::with_status(200));
        let (exporter, board) = exporter(transport.clone());
        let exporter = exporter.with_signer(Arc::new(BrokenSigner));

        let outcome = exporter.on_update(&tool_snapshot("Zapier"), &config(), "p1").await;

        assert_eq!(outcome, ExportOutcome::Failed { stage: ExportStage::Signing });
        assert!(transport.requests().is_empty());
        assert_eq!(board.message().as_deref(), Some(FAILED));
    }

    #[tokio::test]
    async fn test_injected_signer_sets_header() {
        let transport = Arc::new(RecordingTransport::with_status(200));
        let (exporter, _board) = exporter(transport.clone());
        let exporter = exporter.with_signer(Arc::new(FixedSigner));

        exporter.on_update(&tool_snapshot("Zapier"), &config(), "p1").await;
        assert_eq!(transport.requests()[0].signature, "0".repeat(64));
    }

    #[tokio::test]
    async fn test_error_response_status_is_not_inspected() {
        let transport = Arc::new(RecordingTransport::with_status(500));
        let (exporter, board) = exporter(transport.clone());

        let outcome = exporter.on_update(&tool_snapshot("Zapier"), &config(), "p1").await;

        assert!(matches!(outcome, ExportOutcome::Exported { response_status: 500, .. }));
        assert_eq!(board.message().as_deref(), Some(EXPORTED));
    }

    #[tokio::test]
    async fn test_status_sink_sees_every_terminal_state() {
        #[derive(Default)]
        struct Collect(Mutex<Vec<crate::ExportStatus>>);
        impl StatusSink for Collect {
            fn report(&self, status: crate::ExportStatus) {
                self.0.lock().push(status);
            }
        }

        let sink = Arc::new(Collect::default());
        let exporter = Exporter::new(Arc::new(RecordingTransport::with_status(200)), sink.clone());

        exporter.on_update(&tool_snapshot("a"), &ExportConfig::default(), "").await;
        exporter.on_update(&tool_snapshot("a"), &config(), "").await;

        assert_eq!(
            *sink.0.lock(),
            vec![crate::ExportStatus::ConfigMissing, crate::ExportStatus::Exported]
        );
    }
}

mod subscription_tests {
    use super::*;

    fn event(tool: &str) -> UpdateEvent {
        UpdateEvent {
            snapshot: tool_snapshot(tool),
            config: config(),
            page_id: "p1".into(),
        }
    }

    #[tokio::test]
    async fn test_every_update_is_exported() {
        let transport = Arc::new(RecordingTransport::with_status(204));
        let (exporter, board) = exporter(transport.clone());
        let (publisher, stream) = update_channel(8);

        let handle = Arc::new(exporter).subscribe(stream);
        for tool in ["a", "b", "c"] {
            publisher.publish(event(tool)).await.unwrap();
        }
        drop(publisher);
        handle.await.unwrap();

        let mut tools: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["tool"].as_str().unwrap().to_string()
            })
            .collect();
        tools.sort();
        assert_eq!(tools, vec!["a", "b", "c"]);
        assert_eq!(board.message().as_deref(), Some(EXPORTED));
    }

    #[tokio::test]
    async fn test_overlapping_exports_are_not_serialized() {
        let transport = Arc::new(GatedTransport {
            held: "first",
            gate: tokio::sync::Notify::new(),
            calls: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        });
        let (exporter, _board) = exporter(transport.clone());
        let exporter = Arc::new(exporter);
        let (publisher, stream) = update_channel(8);

        let handle = exporter.clone().subscribe(stream);
        publisher.publish(event("first")).await.unwrap();
        publisher.publish(event("second")).await.unwrap();
        drop(publisher);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("overlapping exports deadlocked")
            .unwrap();

        let delivered = transport.delivered.lock().clone();
        assert_eq!(delivered.len(), 2);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        // the second export completed while the first was still in flight
        assert!(String::from_utf8_lossy(&delivered[0]).contains("second"));
        assert!(String::from_utf8_lossy(&delivered[1]).contains("first"));
        assert_eq!(exporter.metrics().succeeded.get(), 2);
    }
}
