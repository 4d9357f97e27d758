//! Error types for the Air Anchor core.

use thiserror::Error;

/// Core errors that can occur while building, signing or decoding records.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The private key file is missing or does not hold a valid key.
    #[error("failed to load private key from {path}: {reason}")]
    KeyLoad { path: String, reason: String },

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed address input: {0}")]
    MalformedAddress(String),

    #[error("data hash mismatch: expected {expected}, got {actual}")]
    DataHashMismatch { expected: String, actual: String },

    #[error("malformed batch: {0}")]
    MalformedBatch(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
