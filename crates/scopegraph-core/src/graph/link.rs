//! Graph links and their endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{GraphError, GraphResult};
use crate::domain::{Point, Semver};

/// One end of a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPoint {
    #[serde(default)]
    pub node_id: Option<Uuid>,
    /// Persisted under the stored key `is_input`.
    #[serde(rename = "is_input", alias = "is_output", default)]
    pub is_output: bool,
    #[serde(rename = "pos", default)]
    pub position: Point,
}

impl LinkPoint {
    pub fn new(node_id: Option<Uuid>, is_output: bool, position: Point) -> Self {
        Self {
            node_id,
            is_output,
            position,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub id: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub package_id: Uuid,
    #[serde(default)]
    pub type_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub config_json: String,
    #[serde(rename = "a")]
    pub endpoint_a: LinkPoint,
    #[serde(rename = "b")]
    pub endpoint_b: LinkPoint,
}

impl GraphLink {
    /// A link from `source` to `destination` with an empty JSON object config.
    pub fn connect(
        id: Uuid,
        type_id: impl Into<String>,
        version: impl Into<String>,
        source: (Uuid, Point),
        destination: (Uuid, Point),
    ) -> Self {
        Self {
            id,
            type_id: type_id.into(),
            version: version.into(),
            config_json: "{}".to_string(),
            endpoint_a: LinkPoint::new(Some(source.0), true, source.1),
            endpoint_b: LinkPoint::new(Some(destination.0), false, destination.1),
            ..Self::default()
        }
    }

    /// `(source, destination)` node ids when both ends are attached.
    pub fn endpoints(&self) -> Option<(Uuid, Uuid)> {
        Some((self.endpoint_a.node_id?, self.endpoint_b.node_id?))
    }

    /// Checks run in a fixed order; the first failure is returned.
    pub fn validate(&self) -> GraphResult<()> {
        if self.id.is_nil() {
            return Err(GraphError::NilLinkId);
        }

        if self.type_id.is_empty() {
            return Err(GraphError::MissingLinkType);
        }

        if let Some((a, b)) = self.endpoints() {
            if a == b {
                return Err(GraphError::IdenticalEndpoints);
            }
        }

        if self.endpoint_a.position == self.endpoint_b.position {
            return Err(GraphError::OverlappingEndpoints);
        }

        if !super::is_valid_json(&self.config_json) {
            return Err(GraphError::InvalidConfigJson);
        }

        Semver::parse(&self.version)?;
        Ok(())
    }
}
