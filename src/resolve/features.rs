//! Feature registry
//!
//! Tracks which `dependency:feature` pairs are enabled during a run. The
//! registry only grows: a feature, once enabled, stays enabled until the run
//! ends. Referencing a dependency always enables its `main` feature.

use std::collections::HashSet;
use std::fmt;

use log::debug;
use serde::{Serialize, Serializer};

use crate::defaults::MAIN_FEATURE;

/// A feature qualified by the dependency that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedFeatureId {
    pub dependency: String,
    pub feature: String,
}

impl QualifiedFeatureId {
    pub fn new(dependency: impl Into<String>, feature: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            feature: feature.into(),
        }
    }
}

impl fmt::Display for QualifiedFeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dependency, self.feature)
    }
}

impl Serialize for QualifiedFeatureId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Splits a comma-separated feature list.
///
/// Segments are trimmed and empty segments are dropped, so `""`, `" "` and
/// `"a,,b"` are all accepted.
pub fn split_features(csv: &str) -> impl Iterator<Item = &str> {
    csv.split(',').map(str::trim).filter(|name| !name.is_empty())
}

/// Append-only set of enabled features, in enablement order.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    order: Vec<QualifiedFeatureId>,
    index: HashSet<QualifiedFeatureId>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables `main` plus every feature in `child_features` for `dependency`.
    ///
    /// Returns the ids that were not enabled before this call.
    pub fn enable(&mut self, dependency: &str, child_features: &str) -> Vec<QualifiedFeatureId> {
        let names = std::iter::once(MAIN_FEATURE).chain(split_features(child_features));
        self.enable_all(dependency, names)
    }

    /// Enables exactly the given features for `dependency`, without the
    /// implicit `main`.
    ///
    /// Returns the ids that were not enabled before this call.
    pub fn enable_all<'a, I>(&mut self, dependency: &str, features: I) -> Vec<QualifiedFeatureId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        features
            .into_iter()
            .map(|feature| QualifiedFeatureId::new(dependency, feature))
            .filter(|id| self.insert(id.clone()))
            .collect()
    }

    fn insert(&mut self, id: QualifiedFeatureId) -> bool {
        if !self.index.insert(id.clone()) {
            return false;
        }
        debug!("feature {} enabled", id);
        self.order.push(id);
        true
    }

    pub fn is_enabled(&self, dependency: &str, feature: &str) -> bool {
        self.index.contains(&QualifiedFeatureId::new(dependency, feature))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Enabled ids in the order they were first enabled.
    pub fn iter(&self) -> impl Iterator<Item = &QualifiedFeatureId> {
        self.order.iter()
    }

    pub fn into_ids(self) -> Vec<QualifiedFeatureId> {
        self.order
    }
}
