//! In-memory fakes for storage traits (testing and local tooling)
//!
//! Provides `MemoryCasStore` and `MemoryDeltaLedger` that satisfy the trait
//! contracts without any external dependencies.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StorageError;
use crate::storage_traits::*;

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Backend("in-memory store lock poisoned".to_string())
}

// ---------------------------------------------------------------------------
// MemoryCasStore
// ---------------------------------------------------------------------------

/// In-memory content-addressed store backed by a `HashMap<digest, bytes>`.
#[derive(Debug, Default)]
pub struct MemoryCasStore {
    store: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCasStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CasStore for MemoryCasStore {
    async fn put(&self, data: &[u8]) -> StorageResult<ContentDigest> {
        let digest = ContentDigest::from_bytes(data);
        let mut store = self.store.lock().map_err(poisoned)?;
        store.insert(digest.as_str().to_string(), data.to_vec());
        Ok(digest)
    }

    async fn get(&self, digest: &ContentDigest) -> StorageResult<Vec<u8>> {
        let store = self.store.lock().map_err(poisoned)?;
        store
            .get(digest.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                digest: digest.as_str().to_string(),
            })
    }

    async fn contains(&self, digest: &ContentDigest) -> StorageResult<bool> {
        let store = self.store.lock().map_err(poisoned)?;
        Ok(store.contains_key(digest.as_str()))
    }
}

// ---------------------------------------------------------------------------
// MemoryDeltaLedger
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct StreamState {
    info: StreamInfo,
    entries: Vec<LedgerEntry>,
}

/// In-memory ledger backed by a `BTreeMap<StreamId, StreamState>`.
#[derive(Debug, Default)]
pub struct MemoryDeltaLedger {
    streams: Mutex<BTreeMap<StreamId, StreamState>>,
}

impl MemoryDeltaLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeltaLedger for MemoryDeltaLedger {
    async fn open_stream(
        &self,
        stream: &StreamId,
        base: &ContentDigest,
    ) -> StorageResult<StreamInfo> {
        let mut streams = self.streams.lock().map_err(poisoned)?;
        if streams.contains_key(stream) {
            return Err(StorageError::StreamExists {
                stream: stream.0.clone(),
            });
        }
        let info = StreamInfo {
            stream: stream.clone(),
            base: base.clone(),
            head_seq: 0,
            opened_at: Utc::now(),
        };
        streams.insert(
            stream.clone(),
            StreamState {
                info: info.clone(),
                entries: Vec::new(),
            },
        );
        tracing::debug!(stream = %stream, base = %base.short(), "ledger stream opened");
        Ok(info)
    }

    async fn append(&self, stream: &StreamId, entry: LedgerEntry) -> StorageResult<()> {
        let mut streams = self.streams.lock().map_err(poisoned)?;
        let state = streams
            .get_mut(stream)
            .ok_or_else(|| StorageError::StreamNotFound {
                stream: stream.0.clone(),
            })?;
        let expected = state.info.head_seq + 1;
        if entry.seq != expected {
            return Err(StorageError::OutOfOrder {
                stream: stream.0.clone(),
                expected,
                actual: entry.seq,
            });
        }
        state.info.head_seq = entry.seq;
        state.entries.push(entry);
        Ok(())
    }

    async fn stream_info(&self, stream: &StreamId) -> StorageResult<StreamInfo> {
        let streams = self.streams.lock().map_err(poisoned)?;
        streams
            .get(stream)
            .map(|s| s.info.clone())
            .ok_or_else(|| StorageError::StreamNotFound {
                stream: stream.0.clone(),
            })
    }

    async fn entries(&self, stream: &StreamId) -> StorageResult<Vec<LedgerEntry>> {
        let streams = self.streams.lock().map_err(poisoned)?;
        let state = streams
            .get(stream)
            .ok_or_else(|| StorageError::StreamNotFound {
                stream: stream.0.clone(),
            })?;
        let mut entries = state.entries.clone();
        entries.sort_by_key(|e| e.seq);
        Ok(entries)
    }

    async fn list_streams(&self) -> StorageResult<Vec<StreamInfo>> {
        let streams = self.streams.lock().map_err(poisoned)?;
        Ok(streams.values().map(|s| s.info.clone()).collect())
    }
}
