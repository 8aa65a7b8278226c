//! Shared test utilities for E2E tests.
//!
//! This module provides a project fixture with a root manifest and helpers
//! that build local upstream git repositories for the binary to fetch.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     if !git_available() {
//!         return;
//!     }
//!     let fixture = TestFixture::new();
//!     let foo = fixture.upstream("foo").commit();
//!     fixture.with_manifest(&manifest(&[("main", vec![dep("foo", &foo)])]));
//!     fixture.command().arg("fetch").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{dep, dep_at, dep_with_features, git_available, manifest, TestFixture};
}

/// Whether a usable `git` is on the `PATH`. Git-backed tests return early
/// when it is not.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=master",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// One `<dependency>` element.
#[allow(dead_code)]
pub fn dep(name: &str, url: &str) -> String {
    format!(r#"<dependency name="{}" url="{}"/>"#, name, url)
}

/// One `<dependency>` element pinned to `revision`.
#[allow(dead_code)]
pub fn dep_at(name: &str, url: &str, revision: &str) -> String {
    format!(
        r#"<dependency name="{}" url="{}" revision="{}"/>"#,
        name, url, revision
    )
}

/// One `<dependency>` element requesting child `features`.
#[allow(dead_code)]
pub fn dep_with_features(name: &str, url: &str, features: &str) -> String {
    format!(
        r#"<dependency name="{}" url="{}" features="{}"/>"#,
        name, url, features
    )
}

/// A `repository.xml` document from `(feature, dependency elements)` pairs.
#[allow(dead_code)]
pub fn manifest(features: &[(&str, Vec<String>)]) -> String {
    let mut xml = String::from("<repository>\n");
    for (name, deps) in features {
        xml.push_str(&format!("  <feature name=\"{}\">\n", name));
        for dep in deps {
            xml.push_str(&format!("    {}\n", dep));
        }
        xml.push_str("  </feature>\n");
    }
    xml.push_str("</repository>\n");
    xml
}

/// A temporary directory holding a `project/` root and any number of
/// upstream repositories under `upstream/`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new fixture with an empty project directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("project")
            .create_dir_all()
            .expect("Failed to create project directory");
        Self { temp_dir }
    }

    /// The root project directory.
    pub fn project(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    /// The default workspace of the project.
    #[allow(dead_code)]
    pub fn workspace(&self) -> PathBuf {
        self.project().join("deps")
    }

    /// Write `repository.xml` in the project directory.
    #[allow(dead_code)]
    pub fn with_manifest(&self, content: &str) -> &Self {
        self.with_file("repository.xml", content)
    }

    /// Write a file relative to the project directory.
    #[allow(dead_code)]
    pub fn with_file(&self, path: &str, content: &str) -> &Self {
        self.temp_dir
            .child("project")
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Start building an upstream repository called `name`.
    #[allow(dead_code)]
    pub fn upstream(&self, name: &str) -> UpstreamBuilder {
        let dir = self.temp_dir.path().join("upstream").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create upstream directory");
        git(&dir, &["init", "-q"]);
        UpstreamBuilder {
            dir,
            manifest: None,
            branches: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Create a command running the binary against this fixture's project.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fetch-deps");
        cmd.current_dir(self.project())
            .env_remove("FETCH_DEPS_ROOT")
            .env_remove("FETCH_DEPS_WORKSPACE")
            .env_remove("FETCH_DEPS_GIT")
            .env_remove("RUST_LOG")
            .env("LC_ALL", "C")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an upstream repository with a `master` branch and optional extra
/// branches and tags, each adding a marker file named after itself.
#[allow(dead_code)]
pub struct UpstreamBuilder {
    dir: PathBuf,
    manifest: Option<String>,
    branches: Vec<String>,
    tags: Vec<String>,
}

#[allow(dead_code)]
impl UpstreamBuilder {
    /// Commit `repository.xml` with this content on `master`.
    pub fn with_manifest(mut self, content: &str) -> Self {
        self.manifest = Some(content.to_string());
        self
    }

    /// Add a branch forked from `master` with a `<branch>.txt` marker.
    pub fn with_branch(mut self, name: &str) -> Self {
        self.branches.push(name.to_string());
        self
    }

    /// Add a tag on a commit forked from `master` with a `<tag>.txt` marker.
    pub fn with_tag(mut self, name: &str) -> Self {
        self.tags.push(name.to_string());
        self
    }

    /// Create the commits and return the repository's URL.
    pub fn commit(self) -> String {
        std::fs::write(self.dir.join("README.md"), "upstream\n").unwrap();
        if let Some(manifest) = &self.manifest {
            std::fs::write(self.dir.join("repository.xml"), manifest).unwrap();
        }
        git(&self.dir, &["add", "."]);
        git(&self.dir, &["commit", "-q", "-m", "initial"]);

        for branch in &self.branches {
            git(&self.dir, &["checkout", "-q", "-b", branch]);
            self.marker_commit(branch);
            git(&self.dir, &["checkout", "-q", "master"]);
        }
        for tag in &self.tags {
            git(&self.dir, &["checkout", "-q", "--detach", "master"]);
            self.marker_commit(tag);
            git(&self.dir, &["tag", tag]);
            git(&self.dir, &["checkout", "-q", "master"]);
        }

        self.dir.to_string_lossy().to_string()
    }

    fn marker_commit(&self, name: &str) {
        std::fs::write(self.dir.join(format!("{}.txt", name)), name).unwrap();
        git(&self.dir, &["add", "."]);
        git(&self.dir, &["commit", "-q", "-m", name]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_project_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.project().is_dir());
    }

    #[test]
    fn test_manifest_helper_builds_features() {
        let xml = manifest(&[
            ("main", vec![dep("foo", "../foo.git")]),
            ("extra", vec![]),
        ]);
        assert!(xml.contains(r#"<feature name="main">"#));
        assert!(xml.contains(r#"<dependency name="foo" url="../foo.git"/>"#));
        assert!(xml.contains(r#"<feature name="extra">"#));
    }
}
