//! Engine configuration.

use serde::{Deserialize, Serialize};

pub const ENV_STRICT_PAYLOADS: &str = "SCOPEGRAPH_STRICT_PAYLOADS";
pub const ENV_VALIDATE_AFTER_APPLY: &str = "SCOPEGRAPH_VALIDATE_AFTER_APPLY";
pub const ENV_MAX_OPERATIONS: &str = "SCOPEGRAPH_MAX_OPERATIONS";

/// Knobs for [`DeltaEngine`](crate::delta::DeltaEngine).
///
/// The default applies deltas exactly as stored documents expect: payloads
/// are only checked for non-nil ids and the module is not revalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fully validate created nodes and links before inserting them.
    pub strict_payloads: bool,
    /// Run module validation after every successful delta.
    pub validate_after_apply: bool,
    /// Reject deltas with more operations than this.
    pub max_operations: Option<usize>,
}

impl EngineConfig {
    /// Read `SCOPEGRAPH_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map(|v| parse_flag(&v)).unwrap_or(false);
        Self {
            strict_payloads: flag(ENV_STRICT_PAYLOADS),
            validate_after_apply: flag(ENV_VALIDATE_AFTER_APPLY),
            max_operations: lookup(ENV_MAX_OPERATIONS).and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_payloads = strict;
        self
    }

    pub fn validating(mut self, validate: bool) -> Self {
        self.validate_after_apply = validate;
        self
    }

    pub fn with_max_operations(mut self, max: usize) -> Self {
        self.max_operations = Some(max);
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
