//! Versioned bot-logic graphs: modules of typed nodes joined by links.

mod error;
mod link;
mod module;
mod node;

pub use error::{GraphError, GraphResult};
pub use link::{GraphLink, LinkPoint};
pub use module::GraphModule;
pub use node::{GraphNode, NodeRole};

/// Whether `s` is a syntactically valid JSON document.
pub(crate) fn is_valid_json(s: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(s).is_ok()
}
