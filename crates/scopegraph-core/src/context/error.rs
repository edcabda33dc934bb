//! Errors for the context tree subsystem.

use uuid::Uuid;

/// Errors produced while building, querying or transforming a context tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("invalid transformation path: {path}")]
    InvalidTransformationPath { path: String },

    #[error("context chain is empty")]
    EmptyChain,

    #[error("context {name} ({id}) does not descend from {expected_parent}")]
    BrokenChain {
        name: String,
        id: Uuid,
        expected_parent: Uuid,
    },

    #[error("invalid hierarchy id: {value}")]
    InvalidHierarchyId { value: String },

    #[error("unknown transformation operation {code}")]
    UnknownOperation { code: u8 },

    #[error("unknown memory container type {code}")]
    UnknownContainerKind { code: u8 },
}

/// Result alias for context operations.
pub type ContextResult<T> = std::result::Result<T, ContextError>;
