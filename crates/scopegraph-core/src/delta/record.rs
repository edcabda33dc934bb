//! Persisted delta batches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{DeltaError, DeltaResult};
use super::operation::{Change, DeltaOperation};

/// Why a delta was recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum UpdateKind {
    #[default]
    Standard,
    Undo,
    Rollback,
    Redo,
}

impl TryFrom<u8> for UpdateKind {
    type Error = DeltaError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Undo),
            2 => Ok(Self::Rollback),
            3 => Ok(Self::Redo),
            code => Err(DeltaError::UnknownUpdateKind { code }),
        }
    }
}

impl From<UpdateKind> for u8 {
    fn from(kind: UpdateKind) -> Self {
        match kind {
            UpdateKind::Standard => 0,
            UpdateKind::Undo => 1,
            UpdateKind::Rollback => 2,
            UpdateKind::Redo => 3,
        }
    }
}

/// An ordered batch of operations attributed to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub id: Uuid,
    #[serde(default)]
    pub account_id: Uuid,
    #[serde(rename = "update_type", default)]
    pub update_kind: UpdateKind,
    #[serde(rename = "delta", alias = "operations", default)]
    pub operations: Vec<DeltaOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DeltaRecord {
    pub fn new(account_id: Uuid, operations: Vec<DeltaOperation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            update_kind: UpdateKind::Standard,
            operations,
            blueprint_id: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn for_blueprint(mut self, blueprint_id: Uuid) -> Self {
        self.blueprint_id = Some(blueprint_id);
        self
    }

    pub fn with_update_kind(mut self, kind: UpdateKind) -> Self {
        self.update_kind = kind;
        self
    }

    /// Dotted key for the external audit log.
    ///
    /// `<blueprint>.<id>` when scoped to a blueprint; otherwise the
    /// environment ids touched by environment package-config operations
    /// (or `unknown`) followed by `.<id>`.
    pub fn ledger_path(&self) -> String {
        if let Some(blueprint) = self.blueprint_id {
            return format!("{blueprint}.{}", self.id);
        }
        let environments: String = self
            .operations
            .iter()
            .filter_map(|op| match &op.change {
                Change::UpdateEnvironmentPackageConfig(p) => Some(p.environment_id.to_string()),
                _ => None,
            })
            .collect();
        let prefix = if environments.is_empty() {
            "unknown".to_string()
        } else {
            environments
        };
        format!("{prefix}.{}", self.id)
    }

    pub fn validate(&self) -> DeltaResult<()> {
        validate_operations(&self.operations)
    }
}

/// Body of an apply-delta request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyDeltaRequest {
    pub operations: Vec<DeltaOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_id: Option<Uuid>,
}

impl ApplyDeltaRequest {
    pub fn into_record(self, account_id: Uuid) -> DeltaRecord {
        DeltaRecord {
            blueprint_id: self.blueprint_id,
            ..DeltaRecord::new(account_id, self.operations)
        }
    }
}

/// First validation failure in list order.
pub fn validate_operations(operations: &[DeltaOperation]) -> DeltaResult<()> {
    operations.iter().try_for_each(DeltaOperation::validate)
}
