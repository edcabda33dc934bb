//! Shared domain value types and the crate-wide error taxonomy.
//!
//! - `Point`: layout coordinates for nodes and link endpoints
//! - `Semver`: semantic version strings carried by modules, nodes and links
//! - `ScopeGraphError`: umbrella error over every subsystem

pub mod error;
pub mod point;
pub mod semver;

pub use error::{Result, ScopeGraphError};
pub use point::Point;
pub use semver::{Semver, SemverError, INITIAL_VERSION};
