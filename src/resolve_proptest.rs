//! Property-based tests for the resolution registries and the walker.
//!
//! These tests use proptest to generate random feature lists and dependency
//! sequences and verify that the registry invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use crate::error::{Error, Result};
    use crate::manifest::{DependencyEdge, Feature, Manifest, MemoryManifestReader};
    use crate::resolve::features::split_features;
    use crate::resolve::{
        resolve, Acceptance, ConflictRegistry, DependencyRecord, FeatureRegistry, Fetcher,
    };
    use proptest::prelude::*;

    struct CountingFetcher {
        calls: RefCell<Vec<String>>,
    }

    impl Fetcher for CountingFetcher {
        fn materialize(&self, record: &DependencyRecord) -> Result<PathBuf> {
            self.calls.borrow_mut().push(record.name.clone());
            Ok(PathBuf::from("/ws").join(&record.name))
        }
    }

    fn edge_strategy() -> impl Strategy<Value = (String, String)> {
        ("[a-d]", "v[1-3]")
    }

    // ============================================================================
    // FeatureRegistry property tests
    // ============================================================================

    proptest! {
        /// Property: referencing a dependency always enables its main feature
        #[test]
        fn enable_always_includes_main(dep in "[a-z]{1,8}", csv in "[a-z, ]{0,20}") {
            let mut registry = FeatureRegistry::new();
            registry.enable(&dep, &csv);
            prop_assert!(registry.is_enabled(&dep, "main"));
        }

        /// Property: every non-empty segment of the request is enabled
        #[test]
        fn enable_covers_every_segment(csv in "[a-z, ]{0,30}") {
            let mut registry = FeatureRegistry::new();
            registry.enable("dep", &csv);
            for name in split_features(&csv) {
                prop_assert!(registry.is_enabled("dep", name), "{} not enabled", name);
            }
        }

        /// Property: the registry never shrinks and never holds duplicates
        #[test]
        fn registry_grows_monotonically(
            requests in prop::collection::vec(("[a-c]", "[a-c,]{0,6}"), 0..20)
        ) {
            let mut registry = FeatureRegistry::new();
            let mut previous = 0;
            for (dep, csv) in &requests {
                registry.enable(dep, csv);
                prop_assert!(registry.len() >= previous);
                previous = registry.len();
            }
            let mut seen: Vec<String> = registry.iter().map(ToString::to_string).collect();
            let total = seen.len();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), total);
        }
    }

    // ============================================================================
    // ConflictRegistry property tests
    // ============================================================================

    proptest! {
        /// Property: the first revision seen for a name wins; repeats of it are
        /// no-ops and any other revision is a conflict
        #[test]
        fn first_write_wins(edges in prop::collection::vec(edge_strategy(), 1..30)) {
            let mut registry = ConflictRegistry::new();
            let mut first: HashMap<String, String> = HashMap::new();

            for (name, rev) in &edges {
                let record = DependencyRecord::new(name.as_str(), "u", rev.as_str());
                let result = registry.accept(&record);
                match first.get(name) {
                    None => {
                        prop_assert_eq!(result.unwrap(), Acceptance::Accepted);
                        first.insert(name.clone(), rev.clone());
                    }
                    Some(bound) if bound == rev => {
                        prop_assert_eq!(result.unwrap(), Acceptance::AlreadyPresent);
                    }
                    Some(_) => {
                        let is_conflict = matches!(result, Err(Error::DependencyConflict { .. }));
                        prop_assert!(is_conflict);
                    }
                }
            }
            prop_assert_eq!(registry.len(), first.len());
        }
    }

    // ============================================================================
    // Walker property tests
    // ============================================================================

    proptest! {
        /// Property: a flat root manifest either fetches every distinct name
        /// exactly once, or aborts because some name has two revisions
        #[test]
        fn flat_manifest_fetches_each_name_once(
            edges in prop::collection::vec(edge_strategy(), 0..20)
        ) {
            let deps = edges
                .iter()
                .map(|(name, rev)| {
                    DependencyEdge::new(name.as_str(), "u").with_revision(rev.as_str())
                })
                .collect();
            let reader = MemoryManifestReader::new()
                .with("/root", Manifest::new(vec![Feature::new("main", deps)]));
            let fetcher = CountingFetcher { calls: RefCell::new(Vec::new()) };

            let mut revisions: HashMap<&str, Vec<&str>> = HashMap::new();
            for (name, rev) in &edges {
                let revs = revisions.entry(name.as_str()).or_default();
                if !revs.contains(&rev.as_str()) {
                    revs.push(rev.as_str());
                }
            }
            let has_conflict = revisions.values().any(|revs| revs.len() > 1);

            let result = resolve(Path::new("/root"), &reader, &fetcher);
            prop_assert_eq!(result.is_err(), has_conflict);

            let calls = fetcher.calls.borrow();
            let mut unique = calls.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), calls.len());
            if !has_conflict {
                prop_assert_eq!(calls.len(), revisions.len());
            }
        }
    }
}
