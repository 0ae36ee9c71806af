//! Error types for export services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Serialization(_) => 400,
            Self::ConfigMissing(_) => 412,
            Self::Transport(_) => 502,
            Self::Unavailable(_) => 503,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::ConfigMissing(_) => "CONFIG_MISSING",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Signing(_) => "SIGNING_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ExportError::Signing("key rejected".into());
        assert_eq!(err.error_code(), "SIGNING_ERROR");
        assert_eq!(err.status_code(), 500);

        let err = ExportError::Transport("connection refused".into());
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: address in use");
    }
}
