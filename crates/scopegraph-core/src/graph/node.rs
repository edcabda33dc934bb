//! Graph nodes.
//!
//! A node is a package-backed action, a reference to another module, or an
//! event entrypoint, depending on which optional fields are populated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{GraphError, GraphResult};
use crate::domain::{Point, Semver};

/// What a node does, derived from its populated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Runs functionality from a package (`type_id` set).
    Action,
    /// Embeds another module (`module_id` set).
    ModuleRef,
    /// Entry point for an event type (`event_type_id` set).
    EventEntry,
    Unassigned,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::ModuleRef => "module_ref",
            Self::EventEntry => "event_entry",
            Self::Unassigned => "unassigned",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_json: Option<String>,

    #[serde(rename = "module_id", default, skip_serializing_if = "Option::is_none")]
    pub module_ref_id: Option<Uuid>,
    #[serde(rename = "module_version", default, skip_serializing_if = "Option::is_none")]
    pub module_ref_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type_id: Option<String>,

    #[serde(default)]
    pub layout: Point,
}

impl GraphNode {
    pub fn new(id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            ..Self::default()
        }
    }

    /// An action node backed by `type_id` at `version` from `package_id`.
    pub fn action(
        id: Uuid,
        label: impl Into<String>,
        package_id: Uuid,
        type_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            package_id: Some(package_id),
            type_id: Some(type_id.into()),
            version: Some(version.into()),
            ..Self::new(id, label)
        }
    }

    pub fn module_ref(id: Uuid, label: impl Into<String>, module: Uuid, version: impl Into<String>) -> Self {
        Self {
            module_ref_id: Some(module),
            module_ref_version: Some(version.into()),
            ..Self::new(id, label)
        }
    }

    pub fn event_entry(id: Uuid, label: impl Into<String>, event_type_id: impl Into<String>) -> Self {
        Self {
            event_type_id: Some(event_type_id.into()),
            ..Self::new(id, label)
        }
    }

    pub fn at(mut self, layout: Point) -> Self {
        self.layout = layout;
        self
    }

    fn populated_roles(&self) -> Vec<NodeRole> {
        let mut roles = Vec::with_capacity(1);
        if self.type_id.is_some() {
            roles.push(NodeRole::Action);
        }
        if self.module_ref_id.is_some() {
            roles.push(NodeRole::ModuleRef);
        }
        if self.event_type_id.is_some() {
            roles.push(NodeRole::EventEntry);
        }
        roles
    }

    /// The node's role; the first populated one wins if several are set.
    pub fn role(&self) -> NodeRole {
        self.populated_roles()
            .first()
            .copied()
            .unwrap_or(NodeRole::Unassigned)
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.id.is_nil() {
            return Err(GraphError::NilNodeId);
        }

        let roles = self.populated_roles();
        if let [first, second, ..] = roles.as_slice() {
            return Err(GraphError::ConflictingRoles {
                first: first.as_str(),
                second: second.as_str(),
            });
        }

        for version in [&self.version, &self.module_ref_version].into_iter().flatten() {
            Semver::parse(version)?;
        }

        if let Some(config) = &self.config_json {
            if !super::is_valid_json(config) {
                return Err(GraphError::InvalidConfigJson);
            }
        }

        Ok(())
    }
}
