//! Global atomic counters for scopegraph.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. when a CLI command finishes).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations, no locking.
pub struct Metrics {
    transformations_applied: AtomicU64,
    operations_applied: AtomicU64,
    deltas_applied: AtomicU64,
    deltas_rejected: AtomicU64,
    replays_executed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            transformations_applied: AtomicU64::new(0),
            operations_applied: AtomicU64::new(0),
            deltas_applied: AtomicU64::new(0),
            deltas_rejected: AtomicU64::new(0),
            replays_executed: AtomicU64::new(0),
        }
    }

    /// Add `n` transformations that reached a mutable container.
    pub fn add_transformations(&self, n: u64) {
        self.transformations_applied.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "transformations_applied", n, "counter incremented");
    }

    pub fn inc_operations(&self) {
        self.operations_applied.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "operations_applied", "counter incremented");
    }

    pub fn inc_deltas_applied(&self) {
        self.deltas_applied.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "deltas_applied", "counter incremented");
    }

    pub fn inc_deltas_rejected(&self) {
        self.deltas_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "deltas_rejected", "counter incremented");
    }

    pub fn inc_replays(&self) {
        self.replays_executed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "replays_executed", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            transformations_applied = self.transformations_applied(),
            operations_applied = self.operations_applied(),
            deltas_applied = self.deltas_applied(),
            deltas_rejected = self.deltas_rejected(),
            replays_executed = self.replays_executed(),
        );
    }

    pub fn transformations_applied(&self) -> u64 {
        self.transformations_applied.load(Ordering::Relaxed)
    }

    pub fn operations_applied(&self) -> u64 {
        self.operations_applied.load(Ordering::Relaxed)
    }

    pub fn deltas_applied(&self) -> u64 {
        self.deltas_applied.load(Ordering::Relaxed)
    }

    pub fn deltas_rejected(&self) -> u64 {
        self.deltas_rejected.load(Ordering::Relaxed)
    }

    pub fn replays_executed(&self) -> u64 {
        self.replays_executed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.transformations_applied.store(0, Ordering::Relaxed);
        self.operations_applied.store(0, Ordering::Relaxed);
        self.deltas_applied.store(0, Ordering::Relaxed);
        self.deltas_rejected.store(0, Ordering::Relaxed);
        self.replays_executed.store(0, Ordering::Relaxed);
    }
}
