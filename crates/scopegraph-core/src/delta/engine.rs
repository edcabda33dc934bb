//! Applying delta operations to graph modules.
//!
//! Every operation is validated, then applied in place. A batch stops at the
//! first failing operation and leaves the successful prefix applied; use
//! [`DeltaEngine::apply_atomic`] when that is not acceptable.

use tracing::debug;

use super::error::{DeltaError, DeltaResult};
use super::operation::{Change, DeltaOperation};
use super::record::DeltaRecord;
use crate::config::EngineConfig;
use crate::graph::GraphModule;
use crate::metrics::METRICS;
use crate::obs::{self, EditSpan};

#[derive(Debug, Clone, Default)]
pub struct DeltaEngine {
    config: EngineConfig,
}

impl DeltaEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate one operation, including payload checks in strict mode.
    pub fn validate(&self, op: &DeltaOperation) -> DeltaResult<()> {
        op.validate()?;
        if !self.config.strict_payloads {
            return Ok(());
        }
        let kind = op.kind();
        let checked = match &op.change {
            Change::CreateNode(node) => node.validate(),
            Change::CreateLink(link) => link.validate(),
            _ => Ok(()),
        };
        checked.map_err(|source| DeltaError::InvalidPayload { kind, source })
    }

    /// Validate then apply a single operation.
    pub fn apply_operation(&self, module: &mut GraphModule, op: &DeltaOperation) -> DeltaResult<()> {
        self.validate(op)?;
        apply_change(module, &op.change)?;
        METRICS.inc_operations();
        Ok(())
    }

    /// Apply every operation of `record` in order, in place.
    ///
    /// Returns the number of operations applied.
    pub fn apply(&self, module: &mut GraphModule, record: &DeltaRecord) -> DeltaResult<usize> {
        let module_id = module.id.to_string();
        let _span = EditSpan::enter(&module_id);

        let result = self.apply_all(module, record);
        match &result {
            Ok(count) => {
                METRICS.inc_deltas_applied();
                obs::emit_delta_applied(&module_id, &record.id.to_string(), *count);
            }
            Err(err) => {
                METRICS.inc_deltas_rejected();
                obs::emit_delta_failed(&module_id, &record.id.to_string(), err);
            }
        }
        result
    }

    fn apply_all(&self, module: &mut GraphModule, record: &DeltaRecord) -> DeltaResult<usize> {
        if let Some(max) = self.config.max_operations {
            if record.operations.len() > max {
                return Err(DeltaError::TooManyOperations {
                    count: record.operations.len(),
                    max,
                });
            }
        }

        for (index, op) in record.operations.iter().enumerate() {
            debug!(index, kind = %op.kind(), "applying delta operation");
            self.apply_operation(module, op)?;
        }

        if self.config.validate_after_apply {
            module.validate().map_err(DeltaError::ModuleInvalid)?;
        }
        Ok(record.operations.len())
    }

    /// Like [`apply`](Self::apply), but `module` is only replaced when the
    /// whole record succeeds.
    pub fn apply_atomic(&self, module: &mut GraphModule, record: &DeltaRecord) -> DeltaResult<usize> {
        let mut draft = module.clone();
        let count = self.apply(&mut draft, record)?;
        *module = draft;
        Ok(count)
    }
}

fn apply_change(module: &mut GraphModule, change: &Change) -> DeltaResult<()> {
    module.nodes_mut();

    match change {
        Change::MoveNode(p) => {
            let node = module.node_mut(p.id).ok_or(DeltaError::NodeNotFound {
                id: p.id,
                aspect: "node position",
            })?;
            node.layout = p.pos;
        }
        Change::MoveLink(p) => {
            let link = module.get_link_mut(p.id).ok_or(DeltaError::LinkNotFound {
                id: p.id,
                aspect: "link position",
            })?;
            link.endpoint_a.position = p.a;
            link.endpoint_b.position = p.b;
        }
        Change::CreateNode(node) => {
            module.nodes_mut().insert(node.id, node.clone());
        }
        Change::CreateLink(link) => {
            module.links_mut().push(link.clone());
        }
        Change::DeleteNode(p) => {
            module.delete_node(p.id);
        }
        Change::DeleteLink(p) => {
            module.delete_link(p.id);
        }
        Change::UpdateNode(patch) => {
            let node = module.node_mut(patch.id).ok_or(DeltaError::NodeNotFound {
                id: patch.id,
                aspect: "node",
            })?;
            patch.merge_into(node);
        }
        Change::UpdateLink(patch) => {
            let link = module.get_link_mut(patch.id).ok_or(DeltaError::LinkNotFound {
                id: patch.id,
                aspect: "link",
            })?;
            patch.merge_into(link);
        }
        Change::UpdateNodePackageConfig(p) => {
            let node = module.node_mut(p.id).ok_or(DeltaError::NodeNotFound {
                id: p.id,
                aspect: "node package config",
            })?;
            node.config_json = Some(p.config.clone());
        }
        Change::UpdateLinkPackageConfig(p) => {
            let link = module.get_link_mut(p.id).ok_or(DeltaError::LinkNotFound {
                id: p.id,
                aspect: "link package config",
            })?;
            link.config_json = p.config.clone();
        }
        Change::CreateModule(p) => {
            module.id = p.id;
            module.label = p.name.clone();
            module.links_mut();
        }
        Change::UpdateModule(p) => {
            module.label = p.name.clone();
        }
        // Environment config lives outside the module graph.
        Change::UpdateEnvironmentPackageConfig(_) => {}
        Change::DeleteModule
        | Change::CreateEnvironment
        | Change::UpdateEnvironment
        | Change::DeleteEnvironment
        | Change::UpdateBot => {
            return Err(DeltaError::Unsupported {
                kind: change.kind(),
            });
        }
    }
    Ok(())
}

/// Apply `record` with the default engine. Stops at the first error.
pub fn apply_delta_to_module(module: &mut GraphModule, record: &DeltaRecord) -> DeltaResult<()> {
    DeltaEngine::default().apply(module, record).map(|_| ())
}

/// Validate and apply one operation with the default engine.
pub fn apply_operation_to_module(module: &mut GraphModule, op: &DeltaOperation) -> DeltaResult<()> {
    DeltaEngine::default().apply_operation(module, op)
}
