//! # Error Handling
//!
//! This module defines the centralized error type for `fetch-deps`. It uses
//! `thiserror` to describe every fatal condition the resolver can hit, so that
//! the graph walker can return failures up to the command layer instead of
//! aborting the process from deep inside the traversal.
//!
//! ## Recoverable vs. fatal
//!
//! Only two situations are recoverable during a run, and neither is an error:
//! a directory without a manifest, and a dependency requested again with the
//! exact same location and revision. Everything represented here unwinds the
//! whole run:
//!
//! - Malformed manifests.
//! - Dependency conflicts (same name, different location or revision).
//! - A workspace path that exists but is not a directory.
//! - Dependency names that are not usable as directory names.
//! - Clone, checkout and pull failures.
//! - Origin mismatches when `--verify-origin` is requested.
//! - I/O errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::resolve::DependencyRecord;

/// Main error type for fetch-deps operations
#[derive(Error, Debug)]
pub enum Error {
    /// A manifest file exists but could not be understood.
    #[error("Manifest parsing error in {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// The same dependency name was requested with two different
    /// location/revision pairs.
    #[error("Dependency mismatch: {requested} conflicts with previously resolved {existing}")]
    DependencyConflict {
        /// The record accepted first.
        existing: DependencyRecord,
        /// The record that was requested later.
        requested: DependencyRecord,
    },

    /// The workspace path exists and is not a directory.
    #[error("Workspace path {} exists and is not a directory", path.display())]
    WorkspaceCollision { path: PathBuf },

    /// A dependency name cannot be used as a workspace subdirectory.
    #[error("Invalid dependency name '{name}': must be a single directory name")]
    InvalidDependencyName { name: String },

    /// `git clone` failed for a reason other than an already populated
    /// target directory.
    #[error("Git clone error for {name} ({url}): {output}")]
    GitClone {
        url: String,
        name: String,
        /// Combined stdout and stderr of the clone process.
        output: String,
    },

    /// Any other git invocation failed.
    #[error("Git command failed in {}: git {command}: {output}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        /// Combined stdout and stderr of the git process.
        output: String,
    },

    /// An existing clone points at a different remote than requested.
    #[error("Existing clone of {name} has origin {actual}, expected {expected}")]
    OriginMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, location: &str, revision: &str) -> DependencyRecord {
        DependencyRecord {
            name: name.to_string(),
            location: location.to_string(),
            revision: revision.to_string(),
        }
    }

    #[test]
    fn test_error_display_conflict_names_both_records() {
        let error = Error::DependencyConflict {
            existing: record("lib", "https://example.com/lib.git", "v1"),
            requested: record("lib", "https://example.com/lib.git", "v2"),
        };
        let display = format!("{}", error);
        assert!(display.contains("Dependency mismatch"));
        assert!(display.contains("lib (https://example.com/lib.git#v1)"));
        assert!(display.contains("lib (https://example.com/lib.git#v2)"));
    }

    #[test]
    fn test_error_display_manifest_parse() {
        let error = Error::ManifestParse {
            path: PathBuf::from("/work/repository.xml"),
            message: "unexpected root element".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Manifest parsing error"));
        assert!(display.contains("/work/repository.xml"));
        assert!(display.contains("unexpected root element"));
    }

    #[test]
    fn test_error_display_workspace_collision() {
        let error = Error::WorkspaceCollision {
            path: PathBuf::from("/work/deps"),
        };
        let display = format!("{}", error);
        assert!(display.contains("/work/deps"));
        assert!(display.contains("not a directory"));
    }

    #[test]
    fn test_error_display_git_clone() {
        let error = Error::GitClone {
            url: "https://example.com/foo.git".to_string(),
            name: "foo".to_string(),
            output: "fatal: repository not found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git clone error for foo"));
        assert!(display.contains("https://example.com/foo.git"));
        assert!(display.contains("repository not found"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "checkout v9".to_string(),
            dir: PathBuf::from("/work/deps/foo"),
            output: "error: pathspec 'v9' did not match".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("git checkout v9"));
        assert!(display.contains("/work/deps/foo"));
        assert!(display.contains("did not match"));
    }

    #[test]
    fn test_error_display_origin_mismatch() {
        let error = Error::OriginMismatch {
            name: "foo".to_string(),
            expected: "u1".to_string(),
            actual: "u2".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("foo"));
        assert!(display.contains("expected u1"));
        assert!(display.contains("origin u2"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }
}
