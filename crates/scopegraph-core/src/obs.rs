//! Structured observability hooks for graph edits, context transformations
//! and history replay.
//!
//! - Module-scoped spans via the [`EditSpan`] RAII guard
//! - `emit_*` helpers for lifecycle events, all at `info!` except failures
//!
//! Filter with `RUST_LOG`; the CLI switches to JSON output with `--json`.

use tracing::{info, warn};

/// RAII guard that enters a module-scoped span while an edit is applied.
///
/// ```ignore
/// let _span = EditSpan::enter("0b6f...");
/// // events emitted here carry module_id = "0b6f..."
/// ```
pub struct EditSpan {
    _span: tracing::span::EnteredSpan,
}

impl EditSpan {
    pub fn enter(module_id: &str) -> Self {
        let span = tracing::info_span!("scopegraph.edit", module_id = %module_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a delta was applied in full.
pub fn emit_delta_applied(module_id: &str, delta_id: &str, operations: usize) {
    info!(
        event = "delta.applied",
        module_id = %module_id,
        delta_id = %delta_id,
        operations = operations,
    );
}

/// Emit event: a delta stopped on an error (warning level).
pub fn emit_delta_failed(module_id: &str, delta_id: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "delta.failed",
        module_id = %module_id,
        delta_id = %delta_id,
        error = %error,
    );
}

/// Emit event: a transformation batch produced a new context tree.
pub fn emit_context_transformed(id_path: &str, batch: usize, applied: usize) {
    info!(
        event = "context.transformed",
        id_path = %id_path,
        batch = batch,
        applied = applied,
    );
}

/// Emit event: an entry was appended to a module's history.
pub fn emit_history_appended(module_id: &str, seq: u64, kind: &str) {
    info!(event = "history.appended", module_id = %module_id, seq = seq, kind = %kind);
}

/// Emit event: a module was rebuilt from its history.
pub fn emit_history_replayed(module_id: &str, entries: usize, deltas: usize, digest: &str) {
    info!(
        event = "history.replayed",
        module_id = %module_id,
        entries = entries,
        deltas = deltas,
        digest = %digest,
    );
}
