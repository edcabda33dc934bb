//! Delta operations: single structural edits to a graph module.
//!
//! On the wire an operation is a numeric `type` plus one populated payload
//! field named after it. In memory it is a [`Change`] enum, so an operation
//! whose payload does not match its type cannot be constructed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{DeltaError, DeltaResult};
use crate::context::Value;
use crate::domain::Point;
use crate::graph::{GraphLink, GraphNode, LinkPoint};

/// Operation type codes as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaKind {
    MoveNode,
    MoveLink,
    CreateNode,
    CreateLink,
    DeleteNode,
    DeleteLink,
    UpdateLink,
    UpdateNode,
    UpdateLinkPackageConfig,
    UpdateNodePackageConfig,
    CreateModule,
    DeleteModule,
    UpdateModule,
    CreateEnvironment,
    UpdateEnvironment,
    DeleteEnvironment,
    UpdateEnvironmentPackageConfig,
    UpdateBot,
}

impl DeltaKind {
    pub const ALL: [DeltaKind; 18] = [
        Self::MoveNode,
        Self::MoveLink,
        Self::CreateNode,
        Self::CreateLink,
        Self::DeleteNode,
        Self::DeleteLink,
        Self::UpdateLink,
        Self::UpdateNode,
        Self::UpdateLinkPackageConfig,
        Self::UpdateNodePackageConfig,
        Self::CreateModule,
        Self::DeleteModule,
        Self::UpdateModule,
        Self::CreateEnvironment,
        Self::UpdateEnvironment,
        Self::DeleteEnvironment,
        Self::UpdateEnvironmentPackageConfig,
        Self::UpdateBot,
    ];

    pub fn code(self) -> u64 {
        self as u64
    }

    pub fn from_code(code: u64) -> DeltaResult<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(DeltaError::UnknownOperation { code })
    }

    /// Kinds that must name the module they edit.
    pub fn requires_module_id(self) -> bool {
        matches!(
            self,
            Self::MoveNode
                | Self::MoveLink
                | Self::CreateNode
                | Self::CreateLink
                | Self::DeleteNode
                | Self::DeleteLink
                | Self::UpdateLink
                | Self::UpdateNode
                | Self::UpdateLinkPackageConfig
                | Self::UpdateNodePackageConfig
                | Self::UpdateModule
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MoveNode => "MoveNode",
            Self::MoveLink => "MoveLink",
            Self::CreateNode => "CreateNode",
            Self::CreateLink => "CreateLink",
            Self::DeleteNode => "DeleteNode",
            Self::DeleteLink => "DeleteLink",
            Self::UpdateLink => "UpdateLink",
            Self::UpdateNode => "UpdateNode",
            Self::UpdateLinkPackageConfig => "UpdateLinkPackageConfig",
            Self::UpdateNodePackageConfig => "UpdateNodePackageConfig",
            Self::CreateModule => "CreateModule",
            Self::DeleteModule => "DeleteModule",
            Self::UpdateModule => "UpdateModule",
            Self::CreateEnvironment => "CreateEnvironment",
            Self::UpdateEnvironment => "UpdateEnvironment",
            Self::DeleteEnvironment => "DeleteEnvironment",
            Self::UpdateEnvironmentPackageConfig => "UpdateEnvironmentPackageConfig",
            Self::UpdateBot => "UpdateBot",
        }
    }
}

impl std::fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveNode {
    #[serde(rename = "node_id")]
    pub id: Uuid,
    pub pos: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLink {
    #[serde(rename = "link_id")]
    pub id: Uuid,
    pub a: Point,
    pub b: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteById {
    pub id: Uuid,
}

/// Sparse node update: every `Some` field overwrites the target's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePatch {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "module_id", default, skip_serializing_if = "Option::is_none")]
    pub module_ref_id: Option<Uuid>,
    #[serde(rename = "module_version", default, skip_serializing_if = "Option::is_none")]
    pub module_ref_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type_id: Option<String>,
}

impl NodePatch {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn merge_into(&self, node: &mut GraphNode) {
        if let Some(label) = &self.label {
            node.label = label.clone();
        }
        if let Some(package_id) = self.package_id {
            node.package_id = Some(package_id);
        }
        if let Some(type_id) = &self.type_id {
            node.type_id = Some(type_id.clone());
        }
        if let Some(version) = &self.version {
            node.version = Some(version.clone());
        }
        if let Some(module) = self.module_ref_id {
            node.module_ref_id = Some(module);
        }
        if let Some(version) = &self.module_ref_version {
            node.module_ref_version = Some(version.clone());
        }
        if let Some(event_type_id) = &self.event_type_id {
            node.event_type_id = Some(event_type_id.clone());
        }
    }
}

/// Sparse link update: every `Some` field overwrites the target's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPatch {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<LinkPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<LinkPoint>,
}

impl LinkPatch {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn merge_into(&self, link: &mut GraphLink) {
        if let Some(label) = &self.label {
            link.label = label.clone();
        }
        if let Some(package_id) = self.package_id {
            link.package_id = package_id;
        }
        if let Some(type_id) = &self.type_id {
            link.type_id = type_id.clone();
        }
        if let Some(version) = &self.version {
            link.version = version.clone();
        }
        if let Some(priority) = self.priority {
            link.priority = priority;
        }
        if let Some(a) = self.a {
            link.endpoint_a = a;
        }
        if let Some(b) = self.b {
            link.endpoint_b = b;
        }
    }
}

/// Replacement config JSON for one node or link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfigUpdate {
    pub id: Uuid,
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateModule {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateModule {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentPackageConfig {
    pub environment_id: Uuid,
    pub package_id: Uuid,
    #[serde(default)]
    pub data: Value,
}

/// The edit an operation performs.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    MoveNode(MoveNode),
    MoveLink(MoveLink),
    CreateNode(GraphNode),
    CreateLink(GraphLink),
    DeleteNode(DeleteById),
    DeleteLink(DeleteById),
    UpdateLink(LinkPatch),
    UpdateNode(NodePatch),
    UpdateLinkPackageConfig(PackageConfigUpdate),
    UpdateNodePackageConfig(PackageConfigUpdate),
    CreateModule(CreateModule),
    DeleteModule,
    UpdateModule(UpdateModule),
    CreateEnvironment,
    UpdateEnvironment,
    DeleteEnvironment,
    UpdateEnvironmentPackageConfig(EnvironmentPackageConfig),
    UpdateBot,
}

impl Change {
    pub fn kind(&self) -> DeltaKind {
        match self {
            Self::MoveNode(_) => DeltaKind::MoveNode,
            Self::MoveLink(_) => DeltaKind::MoveLink,
            Self::CreateNode(_) => DeltaKind::CreateNode,
            Self::CreateLink(_) => DeltaKind::CreateLink,
            Self::DeleteNode(_) => DeltaKind::DeleteNode,
            Self::DeleteLink(_) => DeltaKind::DeleteLink,
            Self::UpdateLink(_) => DeltaKind::UpdateLink,
            Self::UpdateNode(_) => DeltaKind::UpdateNode,
            Self::UpdateLinkPackageConfig(_) => DeltaKind::UpdateLinkPackageConfig,
            Self::UpdateNodePackageConfig(_) => DeltaKind::UpdateNodePackageConfig,
            Self::CreateModule(_) => DeltaKind::CreateModule,
            Self::DeleteModule => DeltaKind::DeleteModule,
            Self::UpdateModule(_) => DeltaKind::UpdateModule,
            Self::CreateEnvironment => DeltaKind::CreateEnvironment,
            Self::UpdateEnvironment => DeltaKind::UpdateEnvironment,
            Self::DeleteEnvironment => DeltaKind::DeleteEnvironment,
            Self::UpdateEnvironmentPackageConfig(_) => DeltaKind::UpdateEnvironmentPackageConfig,
            Self::UpdateBot => DeltaKind::UpdateBot,
        }
    }

    /// The node or link id this change targets, if it has one.
    fn target_id(&self) -> Option<Uuid> {
        match self {
            Self::MoveNode(p) => Some(p.id),
            Self::MoveLink(p) => Some(p.id),
            Self::CreateNode(n) => Some(n.id),
            Self::CreateLink(l) => Some(l.id),
            Self::DeleteNode(p) | Self::DeleteLink(p) => Some(p.id),
            Self::UpdateLink(p) => Some(p.id),
            Self::UpdateNode(p) => Some(p.id),
            Self::UpdateLinkPackageConfig(p) | Self::UpdateNodePackageConfig(p) => Some(p.id),
            Self::CreateModule(p) => Some(p.id),
            _ => None,
        }
    }
}

/// One structural edit, optionally naming the module it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireDeltaOperation", into = "WireDeltaOperation")]
pub struct DeltaOperation {
    pub module_id: Option<Uuid>,
    pub change: Change,
}

impl DeltaOperation {
    pub fn new(module_id: Uuid, change: Change) -> Self {
        Self {
            module_id: Some(module_id),
            change,
        }
    }

    /// An operation that does not target a module (module creation, environments).
    pub fn unscoped(change: Change) -> Self {
        Self {
            module_id: None,
            change,
        }
    }

    pub fn kind(&self) -> DeltaKind {
        self.change.kind()
    }

    /// Checks that need nothing but the operation itself.
    pub fn validate(&self) -> DeltaResult<()> {
        let kind = self.kind();
        if kind.requires_module_id() && self.module_id.map_or(true, |id| id.is_nil()) {
            return Err(DeltaError::InvalidModuleId {
                module_id: self.module_id,
            });
        }

        match &self.change {
            Change::DeleteModule
            | Change::CreateEnvironment
            | Change::UpdateEnvironment
            | Change::DeleteEnvironment
            | Change::UpdateBot => Err(DeltaError::Unsupported { kind }),
            change => match change.target_id() {
                Some(id) if id.is_nil() => Err(DeltaError::InvalidId { kind }),
                _ => Ok(()),
            },
        }
    }
}

/// Stored form: numeric `type` plus one payload field per kind.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WireDeltaOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    module_id: Option<Uuid>,
    #[serde(rename = "type")]
    kind: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    move_node: Option<MoveNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    move_link: Option<MoveLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    create_node: Option<GraphNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    create_link: Option<GraphLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete_node: Option<DeleteById>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete_link: Option<DeleteById>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_node: Option<NodePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_link: Option<LinkPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_node_package_config: Option<PackageConfigUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_link_package_config: Option<PackageConfigUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_environment_package_config: Option<EnvironmentPackageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    create_module: Option<CreateModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_module: Option<UpdateModule>,
}

fn required<T>(payload: Option<T>, kind: DeltaKind) -> DeltaResult<T> {
    payload.ok_or(DeltaError::MissingPayload { kind })
}

impl TryFrom<WireDeltaOperation> for DeltaOperation {
    type Error = DeltaError;

    fn try_from(w: WireDeltaOperation) -> Result<Self, Self::Error> {
        let kind = DeltaKind::from_code(w.kind)?;
        let change = match kind {
            DeltaKind::MoveNode => Change::MoveNode(required(w.move_node, kind)?),
            DeltaKind::MoveLink => Change::MoveLink(required(w.move_link, kind)?),
            DeltaKind::CreateNode => Change::CreateNode(required(w.create_node, kind)?),
            DeltaKind::CreateLink => Change::CreateLink(required(w.create_link, kind)?),
            DeltaKind::DeleteNode => Change::DeleteNode(required(w.delete_node, kind)?),
            DeltaKind::DeleteLink => Change::DeleteLink(required(w.delete_link, kind)?),
            DeltaKind::UpdateLink => Change::UpdateLink(required(w.update_link, kind)?),
            DeltaKind::UpdateNode => Change::UpdateNode(required(w.update_node, kind)?),
            DeltaKind::UpdateLinkPackageConfig => {
                Change::UpdateLinkPackageConfig(required(w.update_link_package_config, kind)?)
            }
            DeltaKind::UpdateNodePackageConfig => {
                Change::UpdateNodePackageConfig(required(w.update_node_package_config, kind)?)
            }
            DeltaKind::CreateModule => Change::CreateModule(required(w.create_module, kind)?),
            DeltaKind::DeleteModule => Change::DeleteModule,
            DeltaKind::UpdateModule => Change::UpdateModule(required(w.update_module, kind)?),
            DeltaKind::CreateEnvironment => Change::CreateEnvironment,
            DeltaKind::UpdateEnvironment => Change::UpdateEnvironment,
            DeltaKind::DeleteEnvironment => Change::DeleteEnvironment,
            DeltaKind::UpdateEnvironmentPackageConfig => Change::UpdateEnvironmentPackageConfig(
                required(w.update_environment_package_config, kind)?,
            ),
            DeltaKind::UpdateBot => Change::UpdateBot,
        };
        Ok(Self {
            module_id: w.module_id,
            change,
        })
    }
}

impl From<DeltaOperation> for WireDeltaOperation {
    fn from(op: DeltaOperation) -> Self {
        let mut w = WireDeltaOperation {
            module_id: op.module_id,
            kind: op.kind().code(),
            ..Self::default()
        };
        match op.change {
            Change::MoveNode(p) => w.move_node = Some(p),
            Change::MoveLink(p) => w.move_link = Some(p),
            Change::CreateNode(p) => w.create_node = Some(p),
            Change::CreateLink(p) => w.create_link = Some(p),
            Change::DeleteNode(p) => w.delete_node = Some(p),
            Change::DeleteLink(p) => w.delete_link = Some(p),
            Change::UpdateLink(p) => w.update_link = Some(p),
            Change::UpdateNode(p) => w.update_node = Some(p),
            Change::UpdateLinkPackageConfig(p) => w.update_link_package_config = Some(p),
            Change::UpdateNodePackageConfig(p) => w.update_node_package_config = Some(p),
            Change::CreateModule(p) => w.create_module = Some(p),
            Change::UpdateModule(p) => w.update_module = Some(p),
            Change::UpdateEnvironmentPackageConfig(p) => {
                w.update_environment_package_config = Some(p)
            }
            Change::DeleteModule
            | Change::CreateEnvironment
            | Change::UpdateEnvironment
            | Change::DeleteEnvironment
            | Change::UpdateBot => {}
        }
        w
    }
}
