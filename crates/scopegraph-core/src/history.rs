//! Module history: replay, undo, redo and rollback over an append-only ledger.
//!
//! A module's base snapshot lives in the [`CasStore`]; every later change is
//! an entry in the module's [`DeltaLedger`] stream. Undo, redo and rollback
//! are recorded as entries of their own, so history is never rewritten. The
//! current state is rebuilt by folding the entries in `seq` order and
//! applying the deltas that survive.

use std::sync::Arc;

use scopegraph_state::{
    CasStore, ContentDigest, DeltaLedger, LedgerEntry, StorageError, StreamId, StreamInfo,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::delta::{DeltaEngine, DeltaError, DeltaRecord};
use crate::graph::{GraphError, GraphModule};
use crate::metrics::METRICS;
use crate::obs;

/// One recorded step in a module's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEntry {
    Delta { record: DeltaRecord },
    Undo,
    Redo,
    /// Drop every applied delta recorded after `target_seq` (0 is the base).
    Rollback { target_seq: u64 },
}

impl HistoryEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delta { .. } => "delta",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Rollback { .. } => "rollback",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("rollback target {target} is not an applied delta")]
    UnknownRollbackTarget { target: u64 },

    #[error("corrupt history entry {seq}: {reason}")]
    CorruptEntry { seq: u64, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("delta rejected: {0}")]
    Delta(#[from] DeltaError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for history operations.
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// State produced by replaying a module's history.
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub module: GraphModule,
    /// Ledger entries taken into account.
    pub entries_considered: usize,
    /// Deltas applied on top of the base snapshot.
    pub deltas_applied: usize,
    /// Digest of the resulting module.
    pub digest: ContentDigest,
}

/// Applied and undone deltas after folding a run of entries.
#[derive(Debug, Default)]
struct Effective {
    applied: Vec<(u64, DeltaRecord)>,
    redo: Vec<(u64, DeltaRecord)>,
}

fn fold(entries: &[(u64, HistoryEntry)]) -> Effective {
    let mut state = Effective::default();
    for (seq, entry) in entries {
        match entry {
            HistoryEntry::Delta { record } => {
                state.applied.push((*seq, record.clone()));
                state.redo.clear();
            }
            HistoryEntry::Undo => {
                if let Some(top) = state.applied.pop() {
                    state.redo.push(top);
                }
            }
            HistoryEntry::Redo => {
                if let Some(top) = state.redo.pop() {
                    state.applied.push(top);
                }
            }
            HistoryEntry::Rollback { target_seq } => {
                state.applied.retain(|(s, _)| s <= target_seq);
                state.redo.clear();
            }
        }
    }
    state
}

/// History of graph modules backed by a CAS store and a delta ledger.
#[derive(Clone)]
pub struct ModuleHistory {
    cas: Arc<dyn CasStore>,
    ledger: Arc<dyn DeltaLedger>,
    engine: DeltaEngine,
}

impl ModuleHistory {
    pub fn new(cas: Arc<dyn CasStore>, ledger: Arc<dyn DeltaLedger>, engine: DeltaEngine) -> Self {
        Self { cas, ledger, engine }
    }

    /// Store `module` as the base snapshot and open its stream.
    pub async fn begin(&self, module: &GraphModule) -> HistoryResult<StreamInfo> {
        let bytes = serde_json::to_vec(module)?;
        let digest = self.cas.put(&bytes).await?;
        let info = self
            .ledger
            .open_stream(&StreamId::for_module(module.id), &digest)
            .await?;
        Ok(info)
    }

    /// Apply `record` to the current state and record it.
    ///
    /// A record that fails to apply is not appended.
    pub async fn commit(&self, module_id: Uuid, record: DeltaRecord) -> HistoryResult<ReplaySummary> {
        let current = self.replay(module_id, None).await?;
        let mut module = current.module;
        self.engine.apply_atomic(&mut module, &record)?;
        self.append(module_id, HistoryEntry::Delta { record }).await?;
        self.replay(module_id, None).await
    }

    /// Undo the newest applied delta.
    pub async fn undo(&self, module_id: Uuid) -> HistoryResult<ReplaySummary> {
        let (_, entries) = self.load(module_id).await?;
        if fold(&entries).applied.is_empty() {
            return Err(HistoryError::NothingToUndo);
        }
        self.append(module_id, HistoryEntry::Undo).await?;
        self.replay(module_id, None).await
    }

    /// Re-apply the most recently undone delta.
    pub async fn redo(&self, module_id: Uuid) -> HistoryResult<ReplaySummary> {
        let (_, entries) = self.load(module_id).await?;
        if fold(&entries).redo.is_empty() {
            return Err(HistoryError::NothingToRedo);
        }
        self.append(module_id, HistoryEntry::Redo).await?;
        self.replay(module_id, None).await
    }

    /// Return to the state right after the delta recorded at `target_seq`
    /// (0 for the base snapshot).
    pub async fn rollback(&self, module_id: Uuid, target_seq: u64) -> HistoryResult<ReplaySummary> {
        let (_, entries) = self.load(module_id).await?;
        let known = target_seq == 0
            || fold(&entries)
                .applied
                .iter()
                .any(|(seq, _)| *seq == target_seq);
        if !known {
            return Err(HistoryError::UnknownRollbackTarget { target: target_seq });
        }
        self.append(module_id, HistoryEntry::Rollback { target_seq })
            .await?;
        self.replay(module_id, None).await
    }

    /// Rebuild the module from its base and every effective delta, looking
    /// only at entries with `seq <= upto` when given.
    #[instrument(skip(self), fields(module_id = %module_id))]
    pub async fn replay(&self, module_id: Uuid, upto: Option<u64>) -> HistoryResult<ReplaySummary> {
        METRICS.inc_replays();

        let (info, mut entries) = self.load(module_id).await?;
        if let Some(limit) = upto {
            entries.retain(|(seq, _)| *seq <= limit);
        }

        let base = self.cas.get(&info.base).await?;
        let mut module: GraphModule = serde_json::from_slice(&base)?;

        let effective = fold(&entries);
        for (_, record) in &effective.applied {
            self.engine.apply(&mut module, record)?;
        }

        let digest = module.digest()?;
        obs::emit_history_replayed(
            &module_id.to_string(),
            entries.len(),
            effective.applied.len(),
            digest.as_str(),
        );

        Ok(ReplaySummary {
            module,
            entries_considered: entries.len(),
            deltas_applied: effective.applied.len(),
            digest,
        })
    }

    /// Every recorded entry, oldest first.
    pub async fn entries(&self, module_id: Uuid) -> HistoryResult<Vec<(u64, HistoryEntry)>> {
        Ok(self.load(module_id).await?.1)
    }

    async fn load(&self, module_id: Uuid) -> HistoryResult<(StreamInfo, Vec<(u64, HistoryEntry)>)> {
        let stream = StreamId::for_module(module_id);
        let info = self.ledger.stream_info(&stream).await?;
        let entries = self
            .ledger
            .entries(&stream)
            .await?
            .into_iter()
            .map(|e| {
                let seq = e.seq;
                serde_json::from_value::<HistoryEntry>(e.payload)
                    .map(|entry| (seq, entry))
                    .map_err(|err| HistoryError::CorruptEntry {
                        seq,
                        reason: err.to_string(),
                    })
            })
            .collect::<HistoryResult<Vec<_>>>()?;
        Ok((info, entries))
    }

    async fn append(&self, module_id: Uuid, entry: HistoryEntry) -> HistoryResult<u64> {
        let stream = StreamId::for_module(module_id);
        let info = self.ledger.stream_info(&stream).await?;
        let seq = info.head_seq + 1;
        let kind = entry.kind();
        let payload = serde_json::to_value(&entry)?;
        self.ledger
            .append(&stream, LedgerEntry::new(seq, kind, payload))
            .await?;
        obs::emit_history_appended(&module_id.to_string(), seq, kind);
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{Change, DeltaOperation, UpdateModule};

    fn rename(module: Uuid, name: &str) -> DeltaRecord {
        DeltaRecord::new(
            Uuid::nil(),
            vec![DeltaOperation::new(
                module,
                Change::UpdateModule(UpdateModule { name: name.into() }),
            )],
        )
    }

    fn seqd(entries: Vec<HistoryEntry>) -> Vec<(u64, HistoryEntry)> {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| (i as u64 + 1, e))
            .collect()
    }

    fn labels(state: &Effective) -> Vec<String> {
        state
            .applied
            .iter()
            .map(|(_, r)| match &r.operations[0].change {
                Change::UpdateModule(u) => u.name.clone(),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn fold_undo_redo() {
        let m = Uuid::new_v4();
        let entries = seqd(vec![
            HistoryEntry::Delta { record: rename(m, "a") },
            HistoryEntry::Delta { record: rename(m, "b") },
            HistoryEntry::Undo,
        ]);
        let state = fold(&entries);
        assert_eq!(labels(&state), vec!["a"]);
        assert_eq!(state.redo.len(), 1);

        let mut more = entries.clone();
        more.push((4, HistoryEntry::Redo));
        assert_eq!(labels(&fold(&more)), vec!["a", "b"]);
    }

    #[test]
    fn new_delta_clears_redo() {
        let m = Uuid::new_v4();
        let entries = seqd(vec![
            HistoryEntry::Delta { record: rename(m, "a") },
            HistoryEntry::Undo,
            HistoryEntry::Delta { record: rename(m, "c") },
            HistoryEntry::Redo,
        ]);
        let state = fold(&entries);
        assert_eq!(labels(&state), vec!["c"]);
        assert!(state.redo.is_empty());
    }

    #[test]
    fn rollback_drops_later_deltas() {
        let m = Uuid::new_v4();
        let entries = seqd(vec![
            HistoryEntry::Delta { record: rename(m, "a") },
            HistoryEntry::Delta { record: rename(m, "b") },
            HistoryEntry::Delta { record: rename(m, "c") },
            HistoryEntry::Rollback { target_seq: 1 },
        ]);
        assert_eq!(labels(&fold(&entries)), vec!["a"]);

        let to_base = seqd(vec![
            HistoryEntry::Delta { record: rename(m, "a") },
            HistoryEntry::Rollback { target_seq: 0 },
        ]);
        assert!(fold(&to_base).applied.is_empty());
    }

    #[test]
    fn entry_wire_form_is_tagged() {
        let v = serde_json::to_value(HistoryEntry::Rollback { target_seq: 3 }).unwrap();
        assert_eq!(v, serde_json::json!({"type": "rollback", "target_seq": 3}));
        let undo: HistoryEntry = serde_json::from_value(serde_json::json!({"type": "undo"})).unwrap();
        assert_eq!(undo, HistoryEntry::Undo);
    }
}
