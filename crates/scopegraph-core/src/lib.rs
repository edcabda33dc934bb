//! scopegraph core library
//!
//! Two independent engines behind one crate:
//!
//! - [`context`]: a linear chain of context levels holding typed memory
//!   containers, addressed by `level.container.key` paths and changed through
//!   copy-on-write transformation batches.
//! - [`graph`] and [`delta`]: versioned bot-logic graphs changed by validated
//!   delta operations, with [`history`] for replay, undo, redo and rollback.

pub mod config;
pub mod context;
pub mod delta;
pub mod domain;
pub mod graph;
pub mod history;
pub mod metrics;
pub mod obs;
pub mod telemetry;

/// Crate version, shared by every workspace member.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::EngineConfig;

pub use context::{
    ContainerKind, ContextDescriptor, ContextError, ContextNode, ContextResult, ContextTree,
    DataPath, MemoryContainer, MemoryUpdate, Operation, PlaceholderRenderer, TemplateError,
    TemplateRenderer, Transformation,
};

pub use delta::{
    apply_delta_to_module, apply_operation_to_module, validate_operations, ApplyDeltaRequest,
    Change, DeltaEngine, DeltaError, DeltaKind, DeltaOperation, DeltaRecord, DeltaResult,
    UpdateKind,
};

pub use domain::{Point, Result, ScopeGraphError, Semver, SemverError, INITIAL_VERSION};

pub use graph::{GraphError, GraphLink, GraphModule, GraphNode, GraphResult, LinkPoint, NodeRole};

pub use history::{HistoryEntry, HistoryError, HistoryResult, ModuleHistory, ReplaySummary};

pub use telemetry::init_tracing;

pub use scopegraph_state::{
    CasStore, ContentDigest, DeltaLedger, LedgerEntry, StorageError, StreamId, StreamInfo,
};
