//! # Dependency Materialization
//!
//! This module provides the `RepositoryManager`, which turns an accepted
//! dependency record into a checked-out directory inside the workspace. It
//! is the resolver's [`Fetcher`].
//!
//! ## Design
//!
//! Git access goes through the `GitOperations` trait so the fetch sequence
//! can be tested without running git. `DefaultGitOperations` wraps the
//! functions in [`crate::git`] and runs a configurable git program.
//!
//! Materializing a dependency is:
//!
//! 1. `git clone <location> <name>` inside the workspace. A populated target
//!    directory counts as already fetched.
//! 2. `git checkout <revision>` inside the dependency directory.
//! 3. `git pull`, unless the checkout left `HEAD` detached (tags and commit
//!    hashes have no branch to pull).
//!
//! Any failure along the way is returned as an error and ends the run.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Error, Result};
use crate::git::CloneOutcome;
use crate::resolve::{DependencyRecord, Fetcher};
use crate::workspace::Workspace;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clones `url` into `workspace_root/<name>`.
    fn clone_into(&self, workspace_root: &Path, url: &str, name: &str) -> Result<CloneOutcome>;

    /// Checks out `revision` in `dir`.
    fn checkout(&self, dir: &Path, revision: &str) -> Result<()>;

    /// Pulls the current branch in `dir`.
    fn pull(&self, dir: &Path) -> Result<()>;

    /// Whether `HEAD` in `dir` is detached.
    fn is_detached(&self, dir: &Path) -> Result<bool>;

    /// The `origin` remote of the repository in `dir`.
    fn origin_url(&self, dir: &Path) -> Result<Option<String>>;
}

/// The default implementation of `GitOperations`, which runs a real git
/// program.
#[derive(Debug, Clone)]
pub struct DefaultGitOperations {
    program: String,
}

impl DefaultGitOperations {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DefaultGitOperations {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitOperations for DefaultGitOperations {
    fn clone_into(&self, workspace_root: &Path, url: &str, name: &str) -> Result<CloneOutcome> {
        crate::git::clone(&self.program, workspace_root, url, name)
    }

    fn checkout(&self, dir: &Path, revision: &str) -> Result<()> {
        crate::git::checkout(&self.program, dir, revision)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        crate::git::pull(&self.program, dir)
    }

    fn is_detached(&self, dir: &Path) -> Result<bool> {
        crate::git::is_detached(&self.program, dir)
    }

    fn origin_url(&self, dir: &Path) -> Result<Option<String>> {
        crate::git::origin_url(&self.program, dir)
    }
}

/// Fetches dependencies into a workspace.
pub struct RepositoryManager {
    git_ops: Box<dyn GitOperations>,
    workspace: Workspace,
    verify_origin: bool,
}

impl RepositoryManager {
    /// Creates a manager that runs `git_program` against `workspace`.
    pub fn new(workspace: Workspace, git_program: &str) -> Self {
        Self::with_operations(Box::new(DefaultGitOperations::new(git_program)), workspace)
    }

    /// Creates a manager with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, workspace: Workspace) -> Self {
        Self {
            git_ops,
            workspace,
            verify_origin: false,
        }
    }

    /// Require existing clones to have `origin` set to the requested
    /// location.
    pub fn verify_origin(mut self, enabled: bool) -> Self {
        self.verify_origin = enabled;
        self
    }

    fn check_origin(&self, record: &DependencyRecord, dir: &Path) -> Result<()> {
        let actual = self.git_ops.origin_url(dir)?.unwrap_or_default();
        if actual != record.location {
            return Err(Error::OriginMismatch {
                name: record.name.clone(),
                expected: record.location.clone(),
                actual,
            });
        }
        Ok(())
    }
}

impl Fetcher for RepositoryManager {
    fn materialize(&self, record: &DependencyRecord) -> Result<PathBuf> {
        let target = self.workspace.dependency_dir(&record.name)?;
        info!(
            "{}: {}#{}",
            target.display(),
            record.location,
            record.revision
        );

        let outcome = self
            .git_ops
            .clone_into(self.workspace.root(), &record.location, &record.name)?;
        if outcome == CloneOutcome::AlreadyPresent {
            info!("{} already exists, reusing it", target.display());
            if self.verify_origin {
                self.check_origin(record, &target)?;
            }
        }

        self.git_ops.checkout(&target, &record.revision)?;

        if self.git_ops.is_detached(&target)? {
            info!(
                "{} is pinned to {} (detached HEAD), not pulling",
                record.name, record.revision
            );
        } else {
            self.git_ops.pull(&target)?;
        }

        Ok(target)
    }
}
