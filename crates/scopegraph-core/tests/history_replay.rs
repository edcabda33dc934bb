//! Module history over the in-memory CAS store and delta ledger.

use std::sync::Arc;

use scopegraph_core::delta::{MoveNode, UpdateModule};
use scopegraph_core::{
    Change, DeltaEngine, DeltaOperation, DeltaRecord, GraphModule, GraphNode, HistoryEntry,
    HistoryError, ModuleHistory, Point, StorageError,
};
use scopegraph_state::fakes::{MemoryCasStore, MemoryDeltaLedger};
use scopegraph_state::{DeltaLedger, StreamId};
use uuid::Uuid;

fn history() -> (ModuleHistory, Arc<MemoryDeltaLedger>) {
    let ledger = Arc::new(MemoryDeltaLedger::new());
    let history = ModuleHistory::new(
        Arc::new(MemoryCasStore::new()),
        ledger.clone(),
        DeltaEngine::default(),
    );
    (history, ledger)
}

fn base() -> GraphModule {
    GraphModule::new(Uuid::new_v4(), "base")
        .with_node(GraphNode::event_entry(Uuid::new_v4(), "start", "evt"))
}

fn rename(module: &GraphModule, name: &str) -> DeltaRecord {
    DeltaRecord::new(
        Uuid::new_v4(),
        vec![DeltaOperation::new(
            module.id,
            Change::UpdateModule(UpdateModule { name: name.into() }),
        )],
    )
}

#[tokio::test]
async fn begin_then_replay_returns_base() {
    let (history, _) = history();
    let module = base();
    let info = history.begin(&module).await.unwrap();
    assert_eq!(info.head_seq, 0);
    assert_eq!(info.base, module.digest().unwrap());

    let summary = history.replay(module.id, None).await.unwrap();
    assert_eq!(summary.module, module);
    assert_eq!(summary.entries_considered, 0);
    assert_eq!(summary.digest, module.digest().unwrap());
}

#[tokio::test]
async fn commit_applies_and_records() {
    let (history, ledger) = history();
    let module = base();
    history.begin(&module).await.unwrap();

    let summary = history.commit(module.id, rename(&module, "a")).await.unwrap();
    assert_eq!(summary.module.label, "a");
    assert_eq!(summary.deltas_applied, 1);

    let stored = ledger.entries(&StreamId::for_module(module.id)).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, "delta");
}

#[tokio::test]
async fn undo_redo_walk_the_stack() {
    let (history, _) = history();
    let module = base();
    history.begin(&module).await.unwrap();
    history.commit(module.id, rename(&module, "a")).await.unwrap();
    history.commit(module.id, rename(&module, "b")).await.unwrap();

    assert_eq!(history.undo(module.id).await.unwrap().module.label, "a");
    assert_eq!(history.undo(module.id).await.unwrap().module.label, "base");
    assert!(matches!(
        history.undo(module.id).await,
        Err(HistoryError::NothingToUndo)
    ));

    assert_eq!(history.redo(module.id).await.unwrap().module.label, "a");
    assert_eq!(history.redo(module.id).await.unwrap().module.label, "b");
    assert!(matches!(
        history.redo(module.id).await,
        Err(HistoryError::NothingToRedo)
    ));

    let kinds: Vec<&str> = history
        .entries(module.id)
        .await
        .unwrap()
        .iter()
        .map(|(_, e)| e.kind())
        .collect();
    assert_eq!(kinds, vec!["delta", "delta", "undo", "undo", "redo", "redo"]);
}

#[tokio::test]
async fn commit_after_undo_discards_redo() {
    let (history, _) = history();
    let module = base();
    history.begin(&module).await.unwrap();
    history.commit(module.id, rename(&module, "a")).await.unwrap();
    history.undo(module.id).await.unwrap();
    history.commit(module.id, rename(&module, "c")).await.unwrap();

    assert!(matches!(
        history.redo(module.id).await,
        Err(HistoryError::NothingToRedo)
    ));
}

#[tokio::test]
async fn rollback_to_earlier_delta_and_base() {
    let (history, _) = history();
    let module = base();
    history.begin(&module).await.unwrap();
    history.commit(module.id, rename(&module, "a")).await.unwrap();
    history.commit(module.id, rename(&module, "b")).await.unwrap();
    history.commit(module.id, rename(&module, "c")).await.unwrap();

    let summary = history.rollback(module.id, 1).await.unwrap();
    assert_eq!(summary.module.label, "a");
    assert_eq!(summary.deltas_applied, 1);

    assert!(matches!(
        history.rollback(module.id, 3).await,
        Err(HistoryError::UnknownRollbackTarget { target: 3 })
    ));

    let summary = history.rollback(module.id, 0).await.unwrap();
    assert_eq!(summary.module, module);
}

#[tokio::test]
async fn replay_upto_views_past_state() {
    let (history, _) = history();
    let module = base();
    history.begin(&module).await.unwrap();
    history.commit(module.id, rename(&module, "a")).await.unwrap();
    history.commit(module.id, rename(&module, "b")).await.unwrap();
    history.undo(module.id).await.unwrap();

    assert_eq!(history.replay(module.id, Some(1)).await.unwrap().module.label, "a");
    assert_eq!(history.replay(module.id, Some(2)).await.unwrap().module.label, "b");
    let now = history.replay(module.id, None).await.unwrap();
    assert_eq!(now.module.label, "a");
    assert_eq!(now.entries_considered, 3);
}

#[tokio::test]
async fn failing_commit_is_not_recorded() {
    let (history, _) = history();
    let module = base();
    history.begin(&module).await.unwrap();

    let bad = DeltaRecord::new(
        Uuid::new_v4(),
        vec![DeltaOperation::new(
            module.id,
            Change::MoveNode(MoveNode {
                id: Uuid::new_v4(),
                pos: Point::new(1, 1),
            }),
        )],
    );
    assert!(matches!(
        history.commit(module.id, bad).await,
        Err(HistoryError::Delta(_))
    ));
    assert!(history.entries(module.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_module_is_a_storage_error() {
    let (history, _) = history();
    let err = history.replay(Uuid::new_v4(), None).await.unwrap_err();
    assert!(matches!(
        err,
        HistoryError::Storage(StorageError::StreamNotFound { .. })
    ));
}

#[tokio::test]
async fn begin_twice_is_rejected() {
    let (history, _) = history();
    let module = base();
    history.begin(&module).await.unwrap();
    assert!(matches!(
        history.begin(&module).await,
        Err(HistoryError::Storage(StorageError::StreamExists { .. }))
    ));
}

#[tokio::test]
async fn entries_decode_recorded_deltas() {
    let (history, _) = history();
    let module = base();
    history.begin(&module).await.unwrap();
    let delta = rename(&module, "a");
    history.commit(module.id, delta.clone()).await.unwrap();

    let entries = history.entries(module.id).await.unwrap();
    assert_eq!(entries, vec![(1, HistoryEntry::Delta { record: delta })]);
}
