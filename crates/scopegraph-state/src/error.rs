//! Error types for scopegraph-state

use thiserror::Error;

/// Errors produced by storage trait implementations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Content digest not present in the store
    #[error("content not found: {digest}")]
    NotFound { digest: String },

    /// Digest string is not 64 lowercase hex characters
    #[error("invalid digest: {digest}")]
    InvalidDigest { digest: String },

    /// Ledger stream has not been opened
    #[error("stream not found: {stream}")]
    StreamNotFound { stream: String },

    /// Ledger stream was already opened with a base snapshot
    #[error("stream already exists: {stream}")]
    StreamExists { stream: String },

    /// Appended entry does not continue the stream's sequence
    #[error("out of order append to {stream}: expected seq {expected}, got {actual}")]
    OutOfOrder {
        stream: String,
        expected: u64,
        actual: u64,
    },

    /// Payload could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Backend-specific failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
