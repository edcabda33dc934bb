//! Memory containers: named, typed key-value scopes on a context level.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ContextError;
use super::transformation::Transformation;
use super::value::{Data, Value};

/// Lifetime and storage tier of a memory container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ContainerKind {
    /// Modifiable, kept only in the execution log.
    Execution,
    /// Modifiable, kept in the session store.
    Session,
    /// Modifiable, kept with the context.
    Context,
    /// Never modified by transformations.
    ReadOnly,
    /// Modifiable, kept in the secret store.
    Secure,
}

impl ContainerKind {
    pub fn is_mutable(self) -> bool {
        self != Self::ReadOnly
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Execution => "execution",
            Self::Session => "session",
            Self::Context => "context",
            Self::ReadOnly => "read_only",
            Self::Secure => "secure",
        }
    }
}

impl TryFrom<u8> for ContainerKind {
    type Error = ContextError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Execution),
            1 => Ok(Self::Session),
            2 => Ok(Self::Context),
            3 => Ok(Self::ReadOnly),
            4 => Ok(Self::Secure),
            code => Err(ContextError::UnknownContainerKind { code }),
        }
    }
}

impl From<ContainerKind> for u8 {
    fn from(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Execution => 0,
            ContainerKind::Session => 1,
            ContainerKind::Context => 2,
            ContainerKind::ReadOnly => 3,
            ContainerKind::Secure => 4,
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named scope of data on one context level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryContainer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContainerKind,
    #[serde(default)]
    pub exposed: bool,
    #[serde(default)]
    pub data: Option<Data>,
}

impl MemoryContainer {
    /// A container with no data yet.
    pub fn new(name: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            exposed: false,
            data: None,
        }
    }

    pub fn exposed(mut self, exposed: bool) -> Self {
        self.exposed = exposed;
        self
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.as_ref()?.get(key)
    }

    /// Insert regardless of kind; kind rules are enforced by [`transform`](Self::transform).
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data
            .get_or_insert_with(Data::new)
            .insert(key.into(), value.into());
        self
    }

    /// Apply transformations using their flat key. Read-only containers are left untouched.
    pub fn transform<'a, I>(&mut self, transformations: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a Transformation>,
    {
        if !self.kind.is_mutable() {
            return self;
        }
        for t in transformations {
            t.apply_to(self.data.get_or_insert_with(Data::new));
        }
        self
    }

    /// Data projected as a JSON object (`null` when the container has none).
    pub fn data_value(&self) -> Value {
        match &self.data {
            Some(data) => Value::Object(data.clone()),
            None => Value::Null,
        }
    }
}

/// The transformations that touched one container, grouped for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUpdate {
    #[serde(rename = "i")]
    pub context_id: Uuid,
    #[serde(rename = "e")]
    pub environment_id: Uuid,
    #[serde(rename = "ct")]
    pub container_kind: ContainerKind,
    #[serde(rename = "c")]
    pub container_name: String,
    #[serde(rename = "t")]
    pub transformations: Vec<Transformation>,
}
