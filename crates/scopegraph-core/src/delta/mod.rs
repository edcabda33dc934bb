//! Graph deltas: tagged structural edits, the batches that carry them, and
//! the engine that applies them to a [`GraphModule`](crate::graph::GraphModule).

mod engine;
mod error;
mod operation;
mod record;

pub use engine::{apply_delta_to_module, apply_operation_to_module, DeltaEngine};
pub use error::{DeltaError, DeltaResult};
pub use operation::{
    Change, CreateModule, DeleteById, DeltaKind, DeltaOperation, EnvironmentPackageConfig,
    LinkPatch, MoveLink, MoveNode, NodePatch, PackageConfigUpdate, UpdateModule,
};
pub use record::{validate_operations, ApplyDeltaRequest, DeltaRecord, UpdateKind};
