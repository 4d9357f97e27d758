//! Error types for the transport layer.

use thiserror::Error;

/// Errors that can occur while talking to the ledger, the certificate
/// authority, or the message broker.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset, or similar.
    #[error("connection error: {0}")]
    Connection(String),

    /// The operation did not complete within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The endpoint answered 404.
    #[error("no such key: {0}")]
    NotFound(String),

    /// The endpoint answered with a non-2xx status other than 404.
    #[error("error status {status}: {reason}")]
    Remote { status: u16, reason: String },

    /// The broker refused or dropped a publish.
    #[error("broker error: {0}")]
    Broker(String),

    /// A base URL could not be used.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A request or response body could not be (de)serialized.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl TransportError {
    /// True for failures worth retrying: connection errors, timeouts, and the
    /// given gateway statuses.
    pub fn is_retryable(&self, retryable_statuses: &[u16]) -> bool {
        match self {
            TransportError::Connection(_) | TransportError::Timeout(_) => true,
            TransportError::Remote { status, .. } => retryable_statuses.contains(status),
            _ => false,
        }
    }
}

impl TransportError {
    /// Classify a reqwest failure; `timeout` is the client deadline that applied.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: std::time::Duration) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(timeout)
        } else if e.is_decode() {
            TransportError::Encoding(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidUrl(e.to_string())
        } else {
            TransportError::Connection(e.to_string())
        }
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
