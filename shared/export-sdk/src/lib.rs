//! Export SDK
//!
//! Turns host table snapshots into signed ingest requests:
//! - Record extraction from the first row of a snapshot
//! - Canonical JSON payload construction
//! - HMAC-SHA256 message signing
//! - HTTP delivery with a fixed, non-leaking status contract

pub mod canonical;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod host;
pub mod signer;
pub mod status;
pub mod stream;
pub mod transport;

#[cfg(test)]
mod tests;

pub use canonical::{build_payload, canonicalize, resolve_tool, ExportPayload, SignedMessage, TOOL_KEYS};
pub use error::{CanonicalError, ExportFailure, SigningError, TransportError};
pub use exporter::{ExportOutcome, ExportStage, Exporter};
pub use extractor::{extract_record, stringify_value, UNNAMED_FIELD};
pub use host::{HostStyle, HostUpdate, StyleValue};
pub use signer::{sign, HmacSha256Signer, MessageSigner};
pub use status::{ExportStatus, FanoutSink, StatusBoard, StatusEntry, StatusSink, TracingStatusSink};
pub use stream::{update_channel, UpdateEvent, UpdatePublisher, UpdateStream};
pub use transport::{
    IngestRequest, IngestResponse, IngestTransport, ReqwestTransport, TransportConfig,
    SIGNATURE_HEADER,
};
