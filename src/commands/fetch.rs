//! # Fetch Command Implementation
//!
//! This module implements the `fetch` subcommand, the main entry point of the
//! tool. Starting from the root manifest it walks the dependency graph
//! breadth-first, cloning and checking out every dependency reachable through
//! an enabled feature, then reports the set of enabled features.
//!
//! ## Process
//!
//! 1. **Workspace**: create the workspace directory if needed. A file in its
//!    place is a fatal error.
//! 2. **Resolution**: read manifests, gate dependencies on enabled features,
//!    reject conflicting requests and fetch each accepted dependency.
//! 3. **Report**: print the fetched dependencies and the enabled features, or
//!    the whole resolution as JSON with `--json`.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use fetch_deps::defaults;
use fetch_deps::manifest::FsManifestReader;
use fetch_deps::output::{emoji, feature_listing, fetched_listing, OutputConfig};
use fetch_deps::repository::RepositoryManager;
use fetch_deps::resolve::{resolve, Resolution};
use fetch_deps::workspace::Workspace;

/// Options shared by every command that resolves and fetches dependencies.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Directory holding the root manifest.
    ///
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR", env = "FETCH_DEPS_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory that receives one subdirectory per dependency.
    ///
    /// Defaults to `deps` under the root directory.
    #[arg(long, value_name = "DIR", env = "FETCH_DEPS_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Git program to run.
    #[arg(
        long,
        value_name = "PROGRAM",
        env = "FETCH_DEPS_GIT",
        default_value = "git"
    )]
    pub git: String,

    /// Fail when an existing clone's origin differs from the requested location.
    #[arg(long)]
    pub verify_origin: bool,
}

impl ResolveArgs {
    pub fn root_dir(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Prepares the workspace and runs the resolution.
    pub fn run(&self) -> Result<Resolution> {
        let root = self.root_dir()?;
        let workspace_root = self
            .workspace
            .clone()
            .unwrap_or_else(|| defaults::default_workspace_root(&root));

        let workspace = Workspace::prepare(workspace_root)?;
        let manager = RepositoryManager::new(workspace, &self.git)
            .verify_origin(self.verify_origin);

        Ok(resolve(&root, &FsManifestReader, &manager)?)
    }
}

/// Resolve the dependency graph and fetch every enabled dependency
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Print the resolution as JSON instead of the plain listing.
    #[arg(long)]
    pub json: bool,

    /// Suppress the final report.
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,
}

/// Execute the `fetch` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: FetchArgs, color_flag: &str) -> Result<()> {
    let resolution = args.resolve.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }
    if args.quiet {
        return Ok(());
    }

    let out = OutputConfig::from_env_and_flag(color_flag);
    if !resolution.fetched.is_empty() {
        println!(
            "{} Fetched {} dependencies:",
            emoji(&out, "📦", "[FETCH]"),
            resolution.fetched.len()
        );
        println!("{}", fetched_listing(&out, &resolution));
    }
    println!("Enabled features:");
    println!("{}", feature_listing(&resolution));

    Ok(())
}
