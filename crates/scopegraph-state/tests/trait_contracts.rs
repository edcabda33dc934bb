//! Trait contract tests for CasStore and DeltaLedger.
//!
//! These tests verify the behavioral contracts of the storage traits
//! using in-memory fakes. Any conforming implementation must pass these.

use scopegraph_state::fakes::{MemoryCasStore, MemoryDeltaLedger};
use scopegraph_state::storage_traits::*;
use scopegraph_state::StorageError;

// ===========================================================================
// CasStore contract tests
// ===========================================================================

#[tokio::test]
async fn cas_put_returns_correct_digest() {
    let store = MemoryCasStore::new();
    let data = br#"{"id":"module"}"#;
    let digest = store.put(data).await.unwrap();

    assert_eq!(digest, ContentDigest::from_bytes(data));
}

#[tokio::test]
async fn cas_get_round_trip() {
    let store = MemoryCasStore::new();
    let data = b"snapshot bytes";
    let digest = store.put(data).await.unwrap();

    assert_eq!(store.get(&digest).await.unwrap(), data);
}

#[tokio::test]
async fn cas_get_not_found() {
    let store = MemoryCasStore::new();
    let bogus = ContentDigest::from_bytes(b"never stored");
    let err = store.get(&bogus).await.unwrap_err();

    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn cas_deduplicates_same_content() {
    let store = MemoryCasStore::new();
    let d1 = store.put(b"identical").await.unwrap();
    let d2 = store.put(b"identical").await.unwrap();

    assert_eq!(d1, d2);
    assert!(store.contains(&d1).await.unwrap());
}

#[test]
fn digest_rejects_non_hex_strings() {
    let err = ContentDigest::try_from("xyz".to_string()).unwrap_err();
    assert!(matches!(err, StorageError::InvalidDigest { .. }));
}

#[test]
fn digest_serializes_as_plain_string() {
    let digest = ContentDigest::from_bytes(b"abc");
    let json = serde_json::to_string(&digest).unwrap();
    assert_eq!(json, format!("\"{}\"", digest.as_str()));

    let back: ContentDigest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, digest);
    assert!(serde_json::from_str::<ContentDigest>("\"nothex\"").is_err());
}

// ===========================================================================
// DeltaLedger contract tests
// ===========================================================================

fn base() -> ContentDigest {
    ContentDigest::from_bytes(b"base snapshot")
}

fn entry(seq: u64, kind: &str) -> LedgerEntry {
    LedgerEntry::new(seq, kind, serde_json::json!({ "seq": seq }))
}

#[tokio::test]
async fn ledger_open_stream_starts_empty() {
    let ledger = MemoryDeltaLedger::new();
    let stream = StreamId::new("module-a");
    let info = ledger.open_stream(&stream, &base()).await.unwrap();

    assert_eq!(info.head_seq, 0);
    assert_eq!(info.base, base());
    assert!(ledger.entries(&stream).await.unwrap().is_empty());
}

#[tokio::test]
async fn ledger_rejects_reopening_a_stream() {
    let ledger = MemoryDeltaLedger::new();
    let stream = StreamId::new("module-a");
    ledger.open_stream(&stream, &base()).await.unwrap();
    let err = ledger.open_stream(&stream, &base()).await.unwrap_err();

    assert!(matches!(err, StorageError::StreamExists { .. }));
}

#[tokio::test]
async fn ledger_append_advances_head() {
    let ledger = MemoryDeltaLedger::new();
    let stream = StreamId::new("module-a");
    ledger.open_stream(&stream, &base()).await.unwrap();

    ledger.append(&stream, entry(1, "delta")).await.unwrap();
    ledger.append(&stream, entry(2, "undo")).await.unwrap();

    let info = ledger.stream_info(&stream).await.unwrap();
    assert_eq!(info.head_seq, 2);

    let kinds: Vec<String> = ledger
        .entries(&stream)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, vec!["delta", "undo"]);
}

#[tokio::test]
async fn ledger_rejects_gaps_and_replays() {
    let ledger = MemoryDeltaLedger::new();
    let stream = StreamId::new("module-a");
    ledger.open_stream(&stream, &base()).await.unwrap();
    ledger.append(&stream, entry(1, "delta")).await.unwrap();

    let gap = ledger.append(&stream, entry(3, "delta")).await.unwrap_err();
    assert!(matches!(
        gap,
        StorageError::OutOfOrder {
            expected: 2,
            actual: 3,
            ..
        }
    ));

    let replayed = ledger.append(&stream, entry(1, "delta")).await.unwrap_err();
    assert!(matches!(replayed, StorageError::OutOfOrder { .. }));
}

#[tokio::test]
async fn ledger_unknown_stream_is_not_found() {
    let ledger = MemoryDeltaLedger::new();
    let stream = StreamId::new("missing");

    assert!(matches!(
        ledger.entries(&stream).await.unwrap_err(),
        StorageError::StreamNotFound { .. }
    ));
    assert!(matches!(
        ledger.append(&stream, entry(1, "delta")).await.unwrap_err(),
        StorageError::StreamNotFound { .. }
    ));
}

#[tokio::test]
async fn ledger_lists_streams_in_id_order() {
    let ledger = MemoryDeltaLedger::new();
    ledger
        .open_stream(&StreamId::new("b"), &base())
        .await
        .unwrap();
    ledger
        .open_stream(&StreamId::new("a"), &base())
        .await
        .unwrap();

    let ids: Vec<String> = ledger
        .list_streams()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.stream.0)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn stream_id_for_module_uses_hyphenated_uuid() {
    let id = uuid::Uuid::new_v4();
    assert_eq!(StreamId::for_module(id).to_string(), id.to_string());
}
