//! Error types for the client.

use air_anchor_core::CoreError;
use air_anchor_transport::TransportError;
use thiserror::Error;

/// Errors that can occur during client operations.
///
/// Remote failures are lifted out of [`TransportError`] into their own
/// variants so callers can branch on them directly.
#[derive(Debug, Error)]
pub enum AnchorError {
    /// The private key file is missing or malformed.
    #[error("key load error: {0}")]
    KeyLoad(String),

    /// Construction or verification failed.
    #[error("core error: {0}")]
    Core(CoreError),

    /// Connection, timeout, or broker failure.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// A REST endpoint answered with a non-2xx status other than 404.
    #[error("error status {status}: {reason}")]
    Remote { status: u16, reason: String },

    /// Nothing stored at the address, or nothing decodable there.
    #[error("no such key: {0}")]
    NotFound(String),

    /// A state envelope could not be decoded (strict mode only).
    #[error("decode error: {0}")]
    Decode(String),

    /// The client was configured inconsistently.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for AnchorError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::KeyLoad { path, reason } => {
                AnchorError::KeyLoad(format!("{path}: {reason}"))
            }
            other => AnchorError::Core(other),
        }
    }
}

impl From<TransportError> for AnchorError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Remote { status, reason } => AnchorError::Remote { status, reason },
            TransportError::NotFound(what) => AnchorError::NotFound(what),
            other => AnchorError::Transport(other),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, AnchorError>;
