//! Declarative edits addressed by a data path.

use serde::{Deserialize, Serialize};

use super::error::ContextError;
use super::path::{self, DataPath};
use super::value::{Data, Value};

/// What a transformation does to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Operation {
    Set,
    Delete,
}

impl TryFrom<u8> for Operation {
    type Error = ContextError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Set),
            1 => Ok(Self::Delete),
            code => Err(ContextError::UnknownOperation { code }),
        }
    }
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Set => 0,
            Operation::Delete => 1,
        }
    }
}

/// A single `set` or `delete` of `level.container.key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub path: String,
    #[serde(default)]
    pub value: Value,
    pub operation: Operation,
}

impl Transformation {
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            operation: Operation::Set,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: Value::Null,
            operation: Operation::Delete,
        }
    }

    /// One `Set` per entry of `data`, addressed under `prefix` (`level.container`).
    pub fn set_all(prefix: &str, data: &Data) -> Vec<Self> {
        data.iter()
            .map(|(key, value)| Self::set(format!("{prefix}.{key}"), value.clone()))
            .collect()
    }

    pub fn path_valid(&self) -> bool {
        path::validate_data_path(&self.path)
    }

    pub fn data_path(&self) -> Option<DataPath> {
        DataPath::parse(&self.path)
    }

    pub fn context_level_name(&self) -> &str {
        path::data_path_context_level_name(&self.path)
    }

    pub fn memory_container_name(&self) -> &str {
        path::data_path_memory_container_name(&self.path)
    }

    pub fn key(&self) -> &str {
        path::data_path_key(&self.path)
    }

    pub fn key_parts(&self) -> Vec<&str> {
        path::data_path_key_parts(&self.path)
    }

    /// Apply to `data` using the flat key (`a.b` is one key, not a nested walk).
    pub(crate) fn apply_to(&self, data: &mut Data) {
        let key = self.key();
        match self.operation {
            Operation::Set => {
                data.insert(key.to_string(), self.value.clone());
            }
            Operation::Delete => {
                data.remove(key);
            }
        }
    }
}

/// Fail with the first transformation whose path does not parse.
pub(crate) fn ensure_paths_valid(batch: &[Transformation]) -> Result<(), ContextError> {
    match batch.iter().find(|t| !t.path_valid()) {
        Some(bad) => Err(ContextError::InvalidTransformationPath {
            path: bad.path.clone(),
        }),
        None => Ok(()),
    }
}
