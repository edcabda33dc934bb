//! Dotted data paths: `level.container.key[.key...]`.
//!
//! Segment 0 names a context level, segment 1 a memory container on that
//! level, and the remaining segments form the key inside the container.
//! Every segment must start with a letter, `_`, `$`, `@` or `-`, and may
//! continue with digits as well.

use std::sync::OnceLock;

use regex::Regex;

const SEGMENT_PATTERN: &str = r"^[A-Za-z_$@\-][A-Za-z_$@\-0-9]*$";

/// Minimum number of segments in a data path.
pub const MIN_SEGMENTS: usize = 3;

fn segment_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEGMENT_PATTERN).ok()).as_ref()
}

fn segment_valid(segment: &str) -> bool {
    segment_regex().is_some_and(|re| re.is_match(segment))
}

/// A validated data path split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataPath {
    level: String,
    container: String,
    key_parts: Vec<String>,
}

impl DataPath {
    /// Parse `path`, returning `None` when it does not match the grammar.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() < MIN_SEGMENTS || !segments.iter().all(|s| segment_valid(s)) {
            return None;
        }
        Some(Self {
            level: segments[0].to_string(),
            container: segments[1].to_string(),
            key_parts: segments[2..].iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn key_parts(&self) -> &[String] {
        &self.key_parts
    }

    /// The key as one flat string (`a.b.c`), which is how writes address data.
    pub fn key(&self) -> String {
        self.key_parts.join(".")
    }

    pub fn has_multipart_key(&self) -> bool {
        self.key_parts.len() > 1
    }
}

impl std::str::FromStr for DataPath {
    type Err = super::ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| super::ContextError::InvalidTransformationPath {
            path: s.to_string(),
        })
    }
}

impl std::fmt::Display for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.level, self.container, self.key())
    }
}

pub fn validate_data_path(path: &str) -> bool {
    DataPath::parse(path).is_some()
}

/// Segment 0 of `path`, or an empty string if there is none.
pub fn data_path_context_level_name(path: &str) -> &str {
    path.split('.').next().unwrap_or_default()
}

/// Segment 1 of `path`, or an empty string if there is none.
pub fn data_path_memory_container_name(path: &str) -> &str {
    path.split('.').nth(1).unwrap_or_default()
}

/// Everything after the container segment, or an empty string.
pub fn data_path_key(path: &str) -> &str {
    path.splitn(3, '.').nth(2).unwrap_or_default()
}

pub fn data_path_key_parts(path: &str) -> Vec<&str> {
    path.split('.').skip(2).collect()
}

pub fn data_path_has_multipart_key(path: &str) -> bool {
    data_path_key_parts(path).len() > 1
}
