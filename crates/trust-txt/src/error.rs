//! Error types for trust-txt.
//!
//! Fetch and validation failures are strongly typed here and converted into
//! [`ResolutionResult::Error`](crate::ResolutionResult::Error) at the engine
//! boundary. Parser anomalies never surface as errors; see
//! [`ParseWarning`](crate::manifest::ParseWarning).

/// Error types covering URI parsing, network access, and persistence.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("Invalid trust URI: {0}")]
    InvalidUri(String),

    #[error("timeout after {0} ms")]
    Timeout(u64),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Delegated validator unavailable: {0}")]
    DelegatedValidatorUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, TrustError>;
