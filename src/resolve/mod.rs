//! Dependency resolution.
//!
//! ## Overview
//!
//! Resolution walks the dependency graph breadth-first, starting at a root
//! directory:
//!
//! 1. The [`walker::GraphWalker`] dequeues a directory and reads its manifest.
//! 2. Features are gated by the [`features::FeatureRegistry`]; every feature of
//!    the root manifest is enabled, every referenced dependency gets `main`
//!    plus whatever its edge requests.
//! 3. Each edge of an enabled feature is checked against the
//!    [`conflicts::ConflictRegistry`], which binds a dependency name to the
//!    first (location, revision) pair it sees.
//! 4. Newly accepted dependencies are materialized by a [`Fetcher`] and their
//!    directories are queued for the same treatment.
//!
//! Both registries live in the walker for the duration of a single run, so
//! independent runs never share state.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::manifest::ManifestReader;

pub mod conflicts;
pub mod features;
pub mod walker;

pub use conflicts::{Acceptance, ConflictRegistry};
pub use features::{FeatureRegistry, QualifiedFeatureId};
pub use walker::{GraphWalker, WalkState, WorkItem};

/// The binding of a dependency name to a location and a concrete revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyRecord {
    pub name: String,
    pub location: String,
    pub revision: String,
}

impl DependencyRecord {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            revision: revision.into(),
        }
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}#{})", self.name, self.location, self.revision)
    }
}

/// Materializes a dependency into the workspace.
///
/// Implementations must be idempotent: materializing a dependency that is
/// already present must succeed and leave it at the requested revision.
pub trait Fetcher {
    /// Fetches `record` and returns the directory it now lives in.
    fn materialize(&self, record: &DependencyRecord) -> Result<PathBuf>;
}

/// A dependency fetched during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedDependency {
    #[serde(flatten)]
    pub record: DependencyRecord,
    /// Where the dependency was materialized.
    pub directory: PathBuf,
    /// Name of the dependency (or `root`) whose manifest first requested it.
    pub requested_by: String,
}

/// The outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Every enabled qualified feature, in the order it was enabled.
    pub enabled_features: Vec<QualifiedFeatureId>,
    /// Every fetched dependency, in fetch order.
    pub fetched: Vec<FetchedDependency>,
}

impl Resolution {
    /// Looks up a fetched dependency by name.
    pub fn dependency(&self, name: &str) -> Option<&FetchedDependency> {
        self.fetched.iter().find(|d| d.record.name == name)
    }

    /// Whether `dependency:feature` ended up enabled.
    pub fn is_enabled(&self, dependency: &str, feature: &str) -> bool {
        self.enabled_features
            .iter()
            .any(|id| id.dependency == dependency && id.feature == feature)
    }
}

/// Resolves and fetches the whole graph rooted at `root`.
pub fn resolve(
    root: &Path,
    reader: &dyn ManifestReader,
    fetcher: &dyn Fetcher,
) -> Result<Resolution> {
    GraphWalker::new(reader, fetcher).run(root)
}
