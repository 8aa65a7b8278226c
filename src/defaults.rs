//! Default values for fetch-deps.
//!
//! This module provides centralized default values used across the resolver
//! and the commands, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Revision used when a dependency does not pin one.
pub const DEFAULT_REVISION: &str = "master";

/// Feature that is enabled for every referenced dependency.
pub const MAIN_FEATURE: &str = "main";

/// Dependency name used to qualify the root directory's features.
pub const ROOT_NAME: &str = "root";

/// Name of the workspace directory created under the root.
pub const WORKSPACE_DIR_NAME: &str = "deps";

/// Manifest file names, in lookup order.
pub const MANIFEST_FILE_NAMES: &[&str] = &["repository.xml", "repository.yaml", "repository.yml"];

/// Returns the default workspace directory for a root directory.
///
/// This can be overridden by the `--workspace` CLI flag or the
/// `FETCH_DEPS_WORKSPACE` environment variable.
pub fn default_workspace_root(root: &Path) -> PathBuf {
    root.join(WORKSPACE_DIR_NAME)
}
