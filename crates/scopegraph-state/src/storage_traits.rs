//! Storage trait definitions for scopegraph
//!
//! These traits define the storage abstractions used by module history:
//! - `CasStore`: content-addressed storage for module snapshots
//! - `DeltaLedger`: append-only, per-stream history of delta entries
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// CasStore: content-addressed storage
// ---------------------------------------------------------------------------

/// Content digest (SHA-256 hex string).
///
/// The inner field is private so the string is always lowercase hex produced
/// by `from_bytes` or checked via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    /// Digest of the compact JSON encoding of `value`.
    pub fn from_json<T: Serialize>(value: &T) -> StorageResult<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(ContentDigest(s.to_ascii_lowercase()))
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content-addressed blob store.
///
/// Guarantees:
/// - `put(data)` always returns the SHA-256 digest of `data`.
/// - `get(digest)` returns the exact bytes previously stored.
/// - Same content always yields the same digest (deduplication).
#[async_trait]
pub trait CasStore: Send + Sync {
    /// Store bytes and return their content digest.
    async fn put(&self, data: &[u8]) -> StorageResult<ContentDigest>;

    /// Retrieve bytes by digest. Returns `StorageError::NotFound` if absent.
    async fn get(&self, digest: &ContentDigest) -> StorageResult<Vec<u8>>;

    /// Check whether a digest exists in the store.
    async fn contains(&self, digest: &ContentDigest) -> StorageResult<bool>;
}

// ---------------------------------------------------------------------------
// DeltaLedger: append-only history streams
// ---------------------------------------------------------------------------

/// Identifier of a ledger stream (one stream per graph module).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(pub String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        StreamId(id.into())
    }

    /// Stream keyed by a module's UUID.
    pub fn for_module(module_id: uuid::Uuid) -> Self {
        StreamId(module_id.to_string())
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single entry in a ledger stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// 1-based, gap-free sequence number within the stream
    pub seq: u64,
    /// Entry kind (e.g. "delta", "undo", "rollback")
    pub kind: String,
    /// Entry payload, opaque to the ledger
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(seq: u64, kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            seq,
            kind: kind.into(),
            payload,
            recorded_at: Utc::now(),
        }
    }
}

/// Stream header: the base snapshot every entry applies on top of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub stream: StreamId,
    /// Digest of the base snapshot in the companion `CasStore`
    pub base: ContentDigest,
    /// Sequence number of the newest entry (0 when empty)
    pub head_seq: u64,
    pub opened_at: DateTime<Utc>,
}

/// Append-only history ledger.
///
/// Guarantees:
/// - A stream is opened once, with the digest of its base snapshot.
/// - Entries carry gap-free `seq` values starting at 1; an append whose `seq`
///   is not `head_seq + 1` is rejected with `StorageError::OutOfOrder`.
/// - Entries are never rewritten or removed.
#[async_trait]
pub trait DeltaLedger: Send + Sync {
    /// Open a new stream on top of `base`.
    async fn open_stream(&self, stream: &StreamId, base: &ContentDigest)
        -> StorageResult<StreamInfo>;

    /// Append an entry to an open stream.
    async fn append(&self, stream: &StreamId, entry: LedgerEntry) -> StorageResult<()>;

    /// Stream header for `stream`.
    async fn stream_info(&self, stream: &StreamId) -> StorageResult<StreamInfo>;

    /// All entries of a stream, ordered by seq.
    async fn entries(&self, stream: &StreamId) -> StorageResult<Vec<LedgerEntry>>;

    /// Headers of every open stream, ordered by stream id.
    async fn list_streams(&self) -> StorageResult<Vec<StreamInfo>>;
}
