//! scopegraph-state: storage abstractions for scopegraph
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: content-addressed module snapshots and append-only history ledgers.
//! The crate knows nothing about graph modules or delta operations; payloads
//! are opaque JSON and bytes.
//!
//! ## Key Components
//!
//! - `CasStore`: content-addressed blob storage (module snapshots)
//! - `DeltaLedger`: per-stream ordered history entries (delta log)
//! - `fakes`: in-memory implementations for tests and the CLI

mod error;
pub mod fakes;
pub mod storage_traits;

pub use error::StorageError;
pub use storage_traits::{
    CasStore, ContentDigest, DeltaLedger, LedgerEntry, StorageResult, StreamId, StreamInfo,
};
