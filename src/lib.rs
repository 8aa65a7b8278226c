//! # fetch-deps Library
//!
//! This library resolves the git dependencies of a repository, honouring
//! per-dependency feature gating, and materializes them into a flat
//! workspace directory. It backs the `fetch-deps` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::{Path, PathBuf};
//! use fetch_deps::error::Result;
//! use fetch_deps::manifest::{DependencyEdge, Feature, Manifest, MemoryManifestReader};
//! use fetch_deps::resolve::{resolve, DependencyRecord, Fetcher};
//!
//! struct NoopFetcher;
//!
//! impl Fetcher for NoopFetcher {
//!     fn materialize(&self, record: &DependencyRecord) -> Result<PathBuf> {
//!         Ok(PathBuf::from("/deps").join(&record.name))
//!     }
//! }
//!
//! let reader = MemoryManifestReader::new().with(
//!     "/project",
//!     Manifest::new(vec![Feature::new(
//!         "main",
//!         vec![DependencyEdge::new("foo", "https://example.com/foo.git")],
//!     )]),
//! );
//!
//! let resolution = resolve(Path::new("/project"), &reader, &NoopFetcher).unwrap();
//! assert_eq!(resolution.fetched.len(), 1);
//! assert!(resolution.is_enabled("foo", "main"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifests (`manifest`)**: `repository.xml` / `repository.yaml` files
//!   declaring named features, each listing dependency edges.
//! - **Resolution (`resolve`)**: a breadth-first walk over manifests that
//!   tracks enabled features and rejects conflicting dependency requests.
//! - **Fetching (`repository`, `git`, `workspace`)**: cloning, checking out
//!   and pulling each accepted dependency into the workspace.
//! - **Reporting (`output`)**: console formatting of a finished resolution.

pub mod defaults;
pub mod error;
pub mod git;
pub mod manifest;
pub mod output;
pub mod repository;
pub mod resolve;
pub mod workspace;

#[cfg(test)]
mod resolve_proptest;
