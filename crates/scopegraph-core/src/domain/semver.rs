//! Semantic version strings (`MAJOR.MINOR.PATCH[-PRE][+BUILD]`).
//!
//! Parsing follows the grammar published at semver.org. Ordering follows
//! semver precedence, with build metadata used only as a final tiebreak so
//! that `Ord` stays consistent with `Eq`.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Version every new module and blueprint starts at.
pub const INITIAL_VERSION: Semver = Semver {
    major: 0,
    minor: 0,
    patch: 1,
    pre: Vec::new(),
    build: Vec::new(),
};

const SEMVER_PATTERN: &str = r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$";

fn semver_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEMVER_PATTERN).ok()).as_ref()
}

/// Error returned when a string is not a semantic version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemverError {
    #[error("empty version string")]
    Empty,

    #[error("'{0}' is not a semantic version")]
    Malformed(String),

    #[error("version component out of range in '{0}'")]
    Overflow(String),
}

/// A parsed semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Semver {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Dot-separated pre-release identifiers (`1.0.0-rc.1` -> `["rc", "1"]`)
    pub pre: Vec<String>,
    /// Dot-separated build metadata identifiers
    pub build: Vec<String>,
}

impl Semver {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
            build: Vec::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, SemverError> {
        if input.is_empty() {
            return Err(SemverError::Empty);
        }
        let caps = semver_regex()
            .and_then(|re| re.captures(input))
            .ok_or_else(|| SemverError::Malformed(input.to_string()))?;

        let number = |idx: usize| -> Result<u64, SemverError> {
            caps[idx]
                .parse::<u64>()
                .map_err(|_| SemverError::Overflow(input.to_string()))
        };
        let identifiers = |idx: usize| -> Vec<String> {
            caps.get(idx)
                .map(|m| m.as_str().split('.').map(str::to_string).collect())
                .unwrap_or_default()
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre: identifiers(4),
            build: identifiers(5),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    pub fn bump_patch(&self) -> Result<Self, SemverError> {
        Ok(Self::new(self.major, self.minor, self.bumped(self.patch)?))
    }

    pub fn bump_minor(&self) -> Result<Self, SemverError> {
        Ok(Self::new(self.major, self.bumped(self.minor)?, 0))
    }

    pub fn bump_major(&self) -> Result<Self, SemverError> {
        Ok(Self::new(self.bumped(self.major)?, 0, 0))
    }

    fn bumped(&self, component: u64) -> Result<u64, SemverError> {
        component
            .checked_add(1)
            .ok_or_else(|| SemverError::Overflow(self.to_string()))
    }

    /// Compare by semver precedence only (build metadata ignored).
    pub fn precedence(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| compare_pre(&self.pre, &other.pre))
    }
}

/// A version without pre-release identifiers outranks one with them; otherwise
/// identifiers compare pairwise, numeric ones numerically and below
/// alphanumeric ones. Numeric identifiers have no leading zeros, so comparing
/// length then digits is numeric order at any width.
fn compare_pre(a: &[String], b: &[String]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = match (is_numeric(x), is_numeric(y)) {
            (true, true) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

impl PartialOrd for Semver {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Semver {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence(other)
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl std::str::FromStr for Semver {
    type Err = SemverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Semver {
    type Error = SemverError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Semver> for String {
    fn from(v: Semver) -> Self {
        v.to_string()
    }
}

impl std::fmt::Display for Semver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre.join("."))?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build.join("."))?;
        }
        Ok(())
    }
}
