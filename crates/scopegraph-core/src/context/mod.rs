//! Scoped memory: a chain of context levels holding typed memory containers,
//! addressed by `level.container.key` paths and changed through
//! copy-on-write transformation batches.

mod descriptor;
mod error;
mod memory;
mod node;
pub mod path;
mod template;
mod transformation;
mod tree;
pub mod value;

pub use descriptor::{expand_uuid, strip_uuid, ContainerDescriptor, ContextDescriptor};
pub use error::{ContextError, ContextResult};
pub use memory::{ContainerKind, MemoryContainer, MemoryUpdate};
pub use node::ContextNode;
pub use path::DataPath;
pub use template::{PlaceholderRenderer, TemplateError, TemplateRenderer};
pub use transformation::{Operation, Transformation};
pub use tree::ContextTree;
pub use value::{Data, Map, Value};
