//! Crate-wide error taxonomy for scopegraph.
//!
//! Each subsystem keeps its own error enum; this type lets callers that
//! drive several subsystems propagate them with a single `?`.

use scopegraph_state::StorageError;

use crate::context::{ContextError, TemplateError};
use crate::delta::DeltaError;
use crate::domain::semver::SemverError;
use crate::graph::GraphError;
use crate::history::HistoryError;

/// scopegraph errors.
#[derive(Debug, thiserror::Error)]
pub enum ScopeGraphError {
    #[error("context error: {0}")]
    Context(#[from] ContextError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("delta error: {0}")]
    Delta(#[from] DeltaError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("version error: {0}")]
    Semver(#[from] SemverError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scopegraph operations.
pub type Result<T> = std::result::Result<T, ScopeGraphError>;
