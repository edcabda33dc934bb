//! One level of the context chain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::memory::MemoryContainer;

/// A named context level owning its memory containers.
///
/// `id` and `name` are fixed at construction. The owning
/// [`ContextTree`](super::ContextTree) keeps `parent_id` in step with the
/// level above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextNode {
    name: String,
    id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parent_ids: Vec<Uuid>,
    #[serde(rename = "ref", default)]
    refs: Vec<String>,
    #[serde(default)]
    memory: Vec<MemoryContainer>,
    #[serde(default)]
    environment_id: Uuid,
}

impl ContextNode {
    pub fn new(name: impl Into<String>, id: Uuid) -> Self {
        Self {
            name: name.into(),
            id,
            parent_id: None,
            parent_ids: Vec::new(),
            refs: Vec::new(),
            memory: Vec::new(),
            environment_id: Uuid::nil(),
        }
    }

    pub fn with_ref(mut self, r: impl Into<String>) -> Self {
        self.refs.push(r.into());
        self
    }

    pub fn with_refs(mut self, refs: Vec<String>) -> Self {
        self.refs = refs;
        self
    }

    pub fn with_environment(mut self, environment_id: Uuid) -> Self {
        self.environment_id = environment_id;
        self
    }

    pub fn with_parent_ids(mut self, parent_ids: Vec<Uuid>) -> Self {
        self.parent_ids = parent_ids;
        self
    }

    pub fn with_container(mut self, container: MemoryContainer) -> Self {
        self.memory.push(container);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    /// Every direct parent recorded for this level in storage.
    pub fn parent_ids(&self) -> &[Uuid] {
        &self.parent_ids
    }

    pub fn refs(&self) -> &[String] {
        &self.refs
    }

    pub fn has_ref(&self, r: &str) -> bool {
        self.refs.iter().any(|x| x == r)
    }

    pub fn environment_id(&self) -> Uuid {
        self.environment_id
    }

    pub fn memory(&self) -> &[MemoryContainer] {
        &self.memory
    }

    /// First container called `name`.
    pub fn memory_container(&self, name: &str) -> Option<&MemoryContainer> {
        self.memory.iter().find(|mc| mc.name == name)
    }

    pub fn memory_container_mut(&mut self, name: &str) -> Option<&mut MemoryContainer> {
        self.memory.iter_mut().find(|mc| mc.name == name)
    }

    pub(crate) fn set_parent_id(&mut self, parent_id: Option<Uuid>) {
        self.parent_id = parent_id;
    }

    pub(crate) fn memory_mut(&mut self) -> &mut Vec<MemoryContainer> {
        &mut self.memory
    }
}
