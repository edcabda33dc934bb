//! Structural validation errors for modules, nodes and links.

use scopegraph_state::StorageError;
use uuid::Uuid;

use crate::domain::SemverError;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("module cannot have nil id")]
    MissingModuleId,

    #[error("module cannot have nil nodes")]
    MissingNodes,

    #[error("module cannot have nil links")]
    MissingLinks,

    #[error("duplicate links {from}-{to}")]
    DuplicateLinks { from: Uuid, to: Uuid },

    #[error("link cannot have nil id")]
    NilLinkId,

    #[error("link type id missing")]
    MissingLinkType,

    #[error("link source and destination cannot be identical")]
    IdenticalEndpoints,

    #[error("both link points cannot occupy the same position")]
    OverlappingEndpoints,

    #[error("config json is invalid")]
    InvalidConfigJson,

    #[error("invalid version: {0}")]
    InvalidVersion(#[from] SemverError),

    #[error("node cannot have nil id")]
    NilNodeId,

    #[error("node cannot be both {first} and {second}")]
    ConflictingRoles {
        first: &'static str,
        second: &'static str,
    },

    #[error("could not digest module: {0}")]
    Digest(#[from] StorageError),
}

/// Result alias for graph validation.
pub type GraphResult<T> = std::result::Result<T, GraphError>;
