//! Graph walker
//!
//! Breadth-first traversal of the dependency graph. The walker owns a FIFO
//! queue of directories plus the feature and conflict registries for one run.
//!
//! For every dequeued directory it:
//!
//! 1. reads the manifest, skipping directories that have none;
//! 2. enables every feature of the manifest if the directory is the root;
//! 3. walks enabled features in declaration order, and their edges in
//!    declaration order;
//! 4. for each edge, enables the requested child features, then offers the
//!    edge to the conflict registry and fetches it if it is new.
//!
//! A dependency's own manifest is only read after it has been fetched, and
//! no directory is visited twice.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{
    Acceptance, ConflictRegistry, FeatureRegistry, FetchedDependency, Fetcher, Resolution,
};
use crate::defaults::ROOT_NAME;
use crate::error::Result;
use crate::manifest::{DependencyEdge, ManifestReader};

/// A directory waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub directory: PathBuf,
    /// Qualifier for this directory's features.
    pub dependency: String,
    pub is_root: bool,
}

impl WorkItem {
    pub fn root(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            dependency: ROOT_NAME.to_string(),
            is_root: true,
        }
    }

    pub fn dependency(directory: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            dependency: name.into(),
            is_root: false,
        }
    }
}

/// Lifecycle of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Not started.
    Idle,
    /// Queue has (or may have) work left.
    Draining,
    /// Queue is empty; the resolution is complete.
    Done,
}

/// Drives a single resolution run.
pub struct GraphWalker<'a> {
    reader: &'a dyn ManifestReader,
    fetcher: &'a dyn Fetcher,
    queue: VecDeque<WorkItem>,
    features: FeatureRegistry,
    resolved: ConflictRegistry,
    fetched: Vec<FetchedDependency>,
    processed: HashSet<String>,
    state: WalkState,
}

impl<'a> GraphWalker<'a> {
    pub fn new(reader: &'a dyn ManifestReader, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            reader,
            fetcher,
            queue: VecDeque::new(),
            features: FeatureRegistry::new(),
            resolved: ConflictRegistry::new(),
            fetched: Vec::new(),
            processed: HashSet::new(),
            state: WalkState::Idle,
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    pub fn resolved(&self) -> &ConflictRegistry {
        &self.resolved
    }

    /// Seeds the queue with the root directory.
    ///
    /// Has no effect unless the walker is idle.
    pub fn start(&mut self, root: &Path) {
        if self.state != WalkState::Idle {
            return;
        }
        self.queue.push_back(WorkItem::root(root));
        self.state = WalkState::Draining;
    }

    /// Processes the next queued directory and returns the new state.
    ///
    /// Any error is fatal for the run; the walker must not be stepped again
    /// afterwards.
    pub fn step(&mut self) -> Result<WalkState> {
        if self.state != WalkState::Draining {
            return Ok(self.state);
        }

        if let Some(item) = self.queue.pop_front() {
            self.process(item)?;
        }

        if self.queue.is_empty() {
            self.state = WalkState::Done;
        }
        Ok(self.state)
    }

    /// Runs the whole traversal from `root`.
    pub fn run(mut self, root: &Path) -> Result<Resolution> {
        self.start(root);
        while self.step()? == WalkState::Draining {}
        Ok(self.finish())
    }

    /// Consumes the walker and returns what it has resolved so far.
    pub fn finish(self) -> Resolution {
        Resolution {
            enabled_features: self.features.into_ids(),
            fetched: self.fetched,
        }
    }

    fn process(&mut self, item: WorkItem) -> Result<()> {
        info!(
            "processing {} ({})",
            item.directory.display(),
            item.dependency
        );
        self.processed.insert(item.dependency.clone());

        let Some(manifest) = self.reader.read(&item.directory)? else {
            info!("no manifest in {}", item.directory.display());
            return Ok(());
        };

        if item.is_root {
            self.features
                .enable_all(&item.dependency, manifest.feature_names());
        }

        for feature in &manifest.features {
            if !self.features.is_enabled(&item.dependency, &feature.name) {
                info!(
                    "feature {}:{} disabled, skipping",
                    item.dependency, feature.name
                );
                continue;
            }

            info!("feature {}:{} enabled", item.dependency, feature.name);
            for edge in &feature.dependencies {
                self.process_edge(&item.dependency, edge)?;
            }
        }

        Ok(())
    }

    fn process_edge(&mut self, parent: &str, edge: &DependencyEdge) -> Result<()> {
        let record = edge.to_record();
        if record.name == ROOT_NAME {
            warn!(
                "dependency {} shares the root qualifier; features merge",
                record
            );
        }

        let added = self.features.enable(&record.name, edge.child_features());
        for id in added
            .iter()
            .filter(|id| self.processed.contains(&id.dependency))
        {
            warn!(
                "feature {} enabled after {} was processed; its dependencies are not fetched",
                id, id.dependency
            );
        }

        match self.resolved.accept(&record)? {
            Acceptance::AlreadyPresent => {
                debug!("{} already resolved, skipping", record);
            }
            Acceptance::Accepted => {
                let directory = self.fetcher.materialize(&record)?;
                self.queue
                    .push_back(WorkItem::dependency(directory.clone(), &record.name));
                self.fetched.push(FetchedDependency {
                    record,
                    directory,
                    requested_by: parent.to_string(),
                });
            }
        }

        Ok(())
    }
}
