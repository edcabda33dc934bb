//! Errors raised while decoding, validating or applying delta operations.

use uuid::Uuid;

use super::operation::DeltaKind;
use crate::graph::GraphError;

#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    #[error("invalid module_id {}", show_module_id(.module_id))]
    InvalidModuleId { module_id: Option<Uuid> },

    #[error("{kind} cannot be null")]
    MissingPayload { kind: DeltaKind },

    #[error("unknown operation {code}")]
    UnknownOperation { code: u64 },

    #[error("unknown update type {code}")]
    UnknownUpdateKind { code: u8 },

    #[error("invalid id")]
    InvalidId { kind: DeltaKind },

    #[error("unsupported operation {kind}")]
    Unsupported { kind: DeltaKind },

    #[error("could not update {aspect} because node did not exist")]
    NodeNotFound { id: Uuid, aspect: &'static str },

    #[error("could not update {aspect} because link did not exist")]
    LinkNotFound { id: Uuid, aspect: &'static str },

    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: DeltaKind,
        #[source]
        source: GraphError,
    },

    #[error("delta has {count} operations, limit is {max}")]
    TooManyOperations { count: usize, max: usize },

    #[error("module invalid after apply: {0}")]
    ModuleInvalid(#[source] GraphError),
}

fn show_module_id(module_id: &Option<Uuid>) -> String {
    module_id.map_or_else(|| "<nil>".to_string(), |id| id.to_string())
}

/// Result alias for delta operations.
pub type DeltaResult<T> = std::result::Result<T, DeltaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages() {
        let id = Uuid::new_v4();
        let cases = [
            (
                DeltaError::NodeNotFound { id, aspect: "node position" },
                "could not update node position because node did not exist",
            ),
            (
                DeltaError::LinkNotFound { id, aspect: "link position" },
                "could not update link position because link did not exist",
            ),
            (
                DeltaError::NodeNotFound { id, aspect: "node" },
                "could not update node because node did not exist",
            ),
            (
                DeltaError::LinkNotFound { id, aspect: "link package config" },
                "could not update link package config because link did not exist",
            ),
        ];
        for (err, msg) in cases {
            assert_eq!(err.to_string(), msg);
        }
    }

    #[test]
    fn module_id_message() {
        let err = DeltaError::InvalidModuleId { module_id: None };
        assert_eq!(err.to_string(), "invalid module_id <nil>");
        let err = DeltaError::InvalidModuleId {
            module_id: Some(Uuid::nil()),
        };
        assert!(err.to_string().starts_with("invalid module_id "));
    }

    #[test]
    fn kind_based_messages() {
        assert_eq!(
            DeltaError::MissingPayload { kind: DeltaKind::MoveNode }.to_string(),
            "MoveNode cannot be null"
        );
        assert_eq!(
            DeltaError::Unsupported { kind: DeltaKind::UpdateBot }.to_string(),
            "unsupported operation UpdateBot"
        );
        assert_eq!(
            DeltaError::UnknownOperation { code: 42 }.to_string(),
            "unknown operation 42"
        );
    }
}
