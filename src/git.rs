//! Git process invocation.
//!
//! Every function shells out to the configured git program, which
//! automatically picks up SSH keys, credential helpers and anything else
//! configured in `~/.gitconfig`. Output is captured so it can be logged and
//! attached to errors.

use std::path::Path;
use std::process::{Command, Output};

use log::info;

use crate::error::{Error, Result};

/// Message git prints when cloning into a populated directory.
const ALREADY_EXISTS: &str = "already exists and is not an empty directory";

/// Captured result of a git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr, trimmed.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !combined.is_empty() && !stderr.is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr);
        combined.trim().to_string()
    }
}

impl From<Output> for GitOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        }
    }
}

/// Result of [`clone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    Cloned,
    /// The target directory already existed and was not empty.
    AlreadyPresent,
}

/// Runs `program args..` in `dir` and captures its output.
///
/// Only a failure to start the process is an error here; exit codes are left
/// to the caller.
pub fn run(program: &str, dir: &Path, args: &[&str]) -> Result<GitOutput> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        // Keep messages in English so they can be matched.
        .env("LC_ALL", "C")
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            output: e.to_string(),
        })?;
    Ok(GitOutput::from(output))
}

/// Runs a git command and fails on a non-zero exit, logging its output.
fn run_checked(program: &str, dir: &Path, args: &[&str]) -> Result<GitOutput> {
    let output = run(program, dir, args)?;
    if !output.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            output: output.combined(),
        });
    }
    log_output(args, &output);
    Ok(output)
}

fn log_output(args: &[&str], output: &GitOutput) {
    let combined = output.combined();
    if !combined.is_empty() {
        info!("git {}: {}", args.join(" "), combined);
    }
}

/// `git clone <url> <name>`, run inside `workspace_root`.
///
/// Cloning into an existing, populated directory is reported as
/// [`CloneOutcome::AlreadyPresent`] rather than an error.
pub fn clone(program: &str, workspace_root: &Path, url: &str, name: &str) -> Result<CloneOutcome> {
    let args = ["clone", url, name];
    let output = run(program, workspace_root, &args)?;

    if output.success() {
        log_output(&args, &output);
        return Ok(CloneOutcome::Cloned);
    }

    let combined = output.combined();
    if combined.contains(ALREADY_EXISTS) {
        return Ok(CloneOutcome::AlreadyPresent);
    }

    Err(Error::GitClone {
        url: url.to_string(),
        name: name.to_string(),
        output: combined,
    })
}

/// `git checkout <revision>` in `dir`.
pub fn checkout(program: &str, dir: &Path, revision: &str) -> Result<()> {
    run_checked(program, dir, &["checkout", revision]).map(|_| ())
}

/// `git pull` in `dir`.
pub fn pull(program: &str, dir: &Path) -> Result<()> {
    run_checked(program, dir, &["pull"]).map(|_| ())
}

/// Whether `HEAD` in `dir` is detached (a tag or commit is checked out).
pub fn is_detached(program: &str, dir: &Path) -> Result<bool> {
    let args = ["symbolic-ref", "-q", "HEAD"];
    let output = run(program, dir, &args)?;
    match output.code {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            output: output.combined(),
        }),
    }
}

/// The `origin` remote URL of the repository in `dir`, if configured.
pub fn origin_url(program: &str, dir: &Path) -> Result<Option<String>> {
    let args = ["config", "--get", "remote.origin.url"];
    let output = run(program, dir, &args)?;
    match output.code {
        Some(0) => Ok(Some(output.stdout.trim().to_string())),
        Some(1) => Ok(None),
        _ => Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            output: output.combined(),
        }),
    }
}
