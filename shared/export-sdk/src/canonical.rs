//! Canonical export payload
//!
//! The bytes produced here are the wire contract: they are both the request
//! body and the exact input of the signature. Field order is fixed by the
//! struct declaration (`report_id`, `page_id`, `tool`, `fields`) and
//! `fields` keeps extraction order.

use export_core::ExtractedRecord;
use serde::Serialize;

use crate::error::CanonicalError;

/// Record keys probed for the tool name, highest priority first
pub const TOOL_KEYS: [&str; 4] = ["Tools", "Tool", "Connector", "Name"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPayload {
    pub report_id: String,
    pub page_id: String,
    pub tool: String,
    pub fields: ExtractedRecord,
}

/// First present key of [`TOOL_KEYS`] wins, even when its value is empty.
pub fn resolve_tool(record: &ExtractedRecord) -> String {
    TOOL_KEYS
        .iter()
        .find_map(|key| record.get(key))
        .unwrap_or_default()
        .to_string()
}

pub fn build_payload(record: ExtractedRecord, report_id: &str, page_id: &str) -> ExportPayload {
    ExportPayload {
        report_id: report_id.to_string(),
        page_id: page_id.to_string(),
        tool: resolve_tool(&record),
        fields: record,
    }
}

/// Compact JSON encoding of the payload.
///
/// `fields` is written in extraction order for every key, including names
/// that look like array indices.
pub fn canonicalize(payload: &ExportPayload) -> Result<Vec<u8>, CanonicalError> {
    Ok(serde_json::to_vec(payload)?)
}

/// Canonical body together with its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    body: Vec<u8>,
    signature: String,
}

impl SignedMessage {
    pub fn new(body: Vec<u8>, signature: String) -> Self {
        Self { body, signature }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.body, self.signature)
    }
}
