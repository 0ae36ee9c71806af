//! Export SDK error types

use export_core::ExportError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Canonical serialization failed: {0}")]
pub struct CanonicalError(#[from] pub serde_json::Error);

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Signing key rejected: {0}")]
    InvalidKey(String),

    #[error("Signing backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid ingest URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Any failure between a validated config and a delivered request
#[derive(Debug, Error)]
pub enum ExportFailure {
    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<CanonicalError> for ExportError {
    fn from(err: CanonicalError) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

impl From<SigningError> for ExportError {
    fn from(err: SigningError) -> Self {
        ExportError::Signing(err.to_string())
    }
}

impl From<TransportError> for ExportError {
    fn from(err: TransportError) -> Self {
        ExportError::Transport(err.to_string())
    }
}

impl From<ExportFailure> for ExportError {
    fn from(err: ExportFailure) -> Self {
        match err {
            ExportFailure::Canonical(e) => e.into(),
            ExportFailure::Signing(e) => e.into(),
            ExportFailure::Transport(e) => e.into(),
        }
    }
}
