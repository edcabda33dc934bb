//! The context chain, root first.
//!
//! Each level has at most one child, so the chain is stored as an owned
//! `Vec` and a level's parent is simply the entry before it. Applying
//! transformations never touches `self`; it builds a fresh chain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ContextError, ContextResult};
use super::memory::{MemoryContainer, MemoryUpdate};
use super::node::ContextNode;
use super::path::DataPath;
use super::template::{TemplateError, TemplateRenderer};
use super::transformation::{ensure_paths_valid, Transformation};
use super::value::{self, Map, Value};
use crate::metrics::METRICS;
use crate::obs;

/// A linear chain of context levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireContext", into = "WireContext")]
pub struct ContextTree {
    nodes: Vec<ContextNode>,
}

/// Nested `child` form used on the wire.
#[derive(Serialize, Deserialize)]
struct WireContext {
    #[serde(flatten)]
    node: ContextNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    child: Option<Box<WireContext>>,
}

impl From<WireContext> for ContextTree {
    fn from(wire: WireContext) -> Self {
        let mut nodes = Vec::new();
        let mut next = Some(Box::new(wire));
        while let Some(level) = next {
            let WireContext { node, child } = *level;
            nodes.push(node);
            next = child;
        }
        let mut tree = Self { nodes };
        tree.relink();
        tree
    }
}

impl From<ContextTree> for WireContext {
    fn from(tree: ContextTree) -> Self {
        let mut child: Option<Box<WireContext>> = None;
        let mut nodes = tree.nodes;
        let root = nodes.remove(0);
        for node in nodes.into_iter().rev() {
            child = Some(Box::new(WireContext { node, child }));
        }
        WireContext { node: root, child }
    }
}

impl ContextTree {
    /// A single-level chain.
    pub fn new(root: ContextNode) -> Self {
        Self { nodes: vec![root] }
    }

    /// Build a chain from levels given root first.
    pub fn from_nodes(nodes: Vec<ContextNode>) -> ContextResult<Self> {
        if nodes.is_empty() {
            return Err(ContextError::EmptyChain);
        }
        let mut tree = Self { nodes };
        tree.relink();
        Ok(tree)
    }

    fn relink(&mut self) {
        for i in 1..self.nodes.len() {
            let parent = self.nodes[i - 1].id();
            self.nodes[i].set_parent_id(Some(parent));
        }
    }

    /// Attach `node` below the current leaf.
    pub fn add_child(&mut self, mut node: ContextNode) -> &mut Self {
        node.set_parent_id(Some(self.leaf().id()));
        self.nodes.push(node);
        self
    }

    pub fn root(&self) -> &ContextNode {
        &self.nodes[0]
    }

    /// The deepest level.
    pub fn leaf(&self) -> &ContextNode {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContextNode> {
        self.nodes.iter()
    }

    /// Levels root to leaf.
    pub fn flatten(&self) -> Vec<&ContextNode> {
        self.nodes.iter().collect()
    }

    /// Visit levels root first until the visitor returns `Ok(false)` or an error.
    pub fn walk<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&ContextNode) -> Result<bool, E>,
    {
        for node in &self.nodes {
            if !visitor(node)? {
                break;
            }
        }
        Ok(())
    }

    /// Dot-joined level ids, root first.
    pub fn id_path(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.id().to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn find_by_name(&self, name: &str) -> Option<&ContextNode> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    pub fn find_by_ref(&self, r: &str) -> Option<&ContextNode> {
        self.nodes.iter().find(|n| n.has_ref(r))
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&ContextNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// The level directly above `id`, if `id` is in the chain and not the root.
    pub fn parent_of(&self, id: Uuid) -> Option<&ContextNode> {
        let pos = self.nodes.iter().position(|n| n.id() == id)?;
        pos.checked_sub(1).map(|p| &self.nodes[p])
    }

    /// Resolve `level.container.key[.key...]`.
    ///
    /// A single key is looked up directly; longer keys walk nested objects
    /// and arrays.
    pub fn get_data(&self, path: &str) -> Option<&Value> {
        let path = DataPath::parse(path)?;
        let container = self
            .find_by_name(path.level())?
            .memory_container(path.container())?;
        let data = container.data.as_ref()?;
        if path.has_multipart_key() {
            value::lookup_in_data(data, path.key_parts())
        } else {
            data.get(&path.key())
        }
    }

    pub fn get_data_string(&self, path: &str) -> Option<String> {
        self.get_data(path).map(value::value_to_string)
    }

    pub fn get_data_int(&self, path: &str) -> Option<i64> {
        self.get_data(path).and_then(value::value_to_i64)
    }

    pub fn get_data_float(&self, path: &str) -> Option<f64> {
        self.get_data(path).and_then(value::value_to_f64)
    }

    /// `{level: {container: data}}` for every level, as consumed by template renderers.
    pub fn project_for_template(&self) -> Map<String, Value> {
        let mut projection = Map::new();
        for node in &self.nodes {
            let containers: Map<String, Value> = node
                .memory()
                .iter()
                .map(|mc| (mc.name.clone(), mc.data_value()))
                .collect();
            projection.insert(node.name().to_string(), Value::Object(containers));
        }
        projection
    }

    pub fn render(
        &self,
        renderer: &dyn TemplateRenderer,
        template: &str,
    ) -> Result<String, TemplateError> {
        renderer.render(template, &self.project_for_template())
    }

    /// A new chain with `batch` applied to copies of every container.
    ///
    /// Any invalid path rejects the whole batch. Transformations naming a
    /// level or container that does not exist are ignored.
    pub fn with_transformations(&self, batch: &[Transformation]) -> ContextResult<ContextTree> {
        ensure_paths_valid(batch)?;

        let mut next = self.clone();
        let mut applied = 0usize;
        for node in &mut next.nodes {
            let level = node.name().to_string();
            for mc in node.memory_mut() {
                let matching: Vec<&Transformation> = batch
                    .iter()
                    .filter(|t| t.context_level_name() == level && t.memory_container_name() == mc.name)
                    .collect();
                if mc.kind.is_mutable() {
                    applied += matching.len();
                }
                mc.transform(matching);
            }
        }
        next.relink();

        METRICS.add_transformations(applied as u64);
        obs::emit_context_transformed(&self.id_path(), batch.len(), applied);
        Ok(next)
    }

    /// Group `batch` per mutable container it touches, in chain order.
    pub fn memory_updates(&self, batch: &[Transformation]) -> ContextResult<Vec<MemoryUpdate>> {
        ensure_paths_valid(batch)?;

        let mut updates = Vec::new();
        for node in &self.nodes {
            for mc in node.memory().iter().filter(|mc| mc.kind.is_mutable()) {
                let transformations: Vec<Transformation> = batch
                    .iter()
                    .filter(|t| {
                        t.context_level_name() == node.name() && t.memory_container_name() == mc.name
                    })
                    .cloned()
                    .collect();
                if transformations.is_empty() {
                    continue;
                }
                updates.push(MemoryUpdate {
                    context_id: node.id(),
                    environment_id: node.environment_id(),
                    container_kind: mc.kind,
                    container_name: mc.name.clone(),
                    transformations,
                });
            }
        }
        Ok(updates)
    }

    /// Containers flagged as exposed, root first.
    pub fn exposed_memory(&self) -> Vec<(&ContextNode, &MemoryContainer)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.memory()
                    .iter()
                    .filter(|mc| mc.exposed)
                    .map(move |mc| (node, mc))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ContextTree {
    type Item = &'a ContextNode;
    type IntoIter = std::slice::Iter<'a, ContextNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
