//! Graph modules: one unit of bot logic.

use std::collections::{BTreeMap, HashSet};

use scopegraph_state::ContentDigest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{GraphError, GraphResult};
use super::link::GraphLink;
use super::node::GraphNode;

/// A graph of nodes and links.
///
/// `nodes` and `links` stay `None` until something is written to them, which
/// keeps "never initialized" distinguishable from "empty" when validating
/// stored documents. Nodes are kept in a `BTreeMap` so the JSON form, and
/// with it the digest, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphModule {
    pub id: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub nodes: Option<BTreeMap<Uuid, GraphNode>>,
    #[serde(default)]
    pub links: Option<Vec<GraphLink>>,
}

impl GraphModule {
    /// An empty module with initialized collections.
    pub fn new(id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            nodes: Some(BTreeMap::new()),
            links: Some(Vec::new()),
        }
    }

    pub fn with_node(mut self, node: GraphNode) -> Self {
        self.nodes_mut().insert(node.id, node);
        self
    }

    pub fn with_link(mut self, link: GraphLink) -> Self {
        self.links_mut().push(link);
        self
    }

    pub fn nodes_mut(&mut self) -> &mut BTreeMap<Uuid, GraphNode> {
        self.nodes.get_or_insert_with(BTreeMap::new)
    }

    pub fn links_mut(&mut self) -> &mut Vec<GraphLink> {
        self.links.get_or_insert_with(Vec::new)
    }

    pub fn node(&self, id: Uuid) -> Option<&GraphNode> {
        self.nodes.as_ref()?.get(&id)
    }

    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut GraphNode> {
        self.nodes.as_mut()?.get_mut(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn link_count(&self) -> usize {
        self.links.as_ref().map_or(0, Vec::len)
    }

    /// First link with `id`.
    pub fn get_link(&self, id: Uuid) -> Option<&GraphLink> {
        self.links.as_ref()?.iter().find(|l| l.id == id)
    }

    pub fn get_link_mut(&mut self, id: Uuid) -> Option<&mut GraphLink> {
        self.links.as_mut()?.iter_mut().find(|l| l.id == id)
    }

    /// Remove the first link with `id`, keeping the order of the rest.
    pub fn delete_link(&mut self, id: Uuid) -> Option<GraphLink> {
        let links = self.links.as_mut()?;
        let idx = links.iter().position(|l| l.id == id)?;
        Some(links.remove(idx))
    }

    pub fn delete_node(&mut self, id: Uuid) -> Option<GraphNode> {
        self.nodes.as_mut()?.remove(&id)
    }

    /// Module-level checks. Links are scanned in order and the first
    /// repeated `(source, destination)` pair is reported.
    pub fn validate(&self) -> GraphResult<()> {
        if self.id.is_nil() {
            return Err(GraphError::MissingModuleId);
        }
        if self.nodes.is_none() {
            return Err(GraphError::MissingNodes);
        }
        let links = self.links.as_ref().ok_or(GraphError::MissingLinks)?;

        let mut seen = HashSet::new();
        for (from, to) in links.iter().filter_map(GraphLink::endpoints) {
            if !seen.insert((from, to)) {
                return Err(GraphError::DuplicateLinks { from, to });
            }
        }
        Ok(())
    }

    /// SHA-256 digest of the module's JSON form.
    pub fn digest(&self) -> GraphResult<ContentDigest> {
        Ok(ContentDigest::from_json(self)?)
    }
}
