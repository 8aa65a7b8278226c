//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks the root
//! manifest without fetching anything.
//!
//! ## Functionality
//!
//! - **Manifest Validation**: Locates and parses the manifest, reporting
//!   syntax errors and missing required attributes.
//! - **Summary**: Lists the declared features with their dependency counts.
//! - **Conflict Detection**: Flags a dependency name declared twice in the
//!   manifest with a different location or revision. Such a manifest always
//!   fails to resolve once both features are enabled.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use fetch_deps::manifest::{self, Manifest};
use fetch_deps::output::{emoji, OutputConfig};
use fetch_deps::resolve::ConflictRegistry;

/// Check the root manifest without fetching anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory holding the manifest to validate.
    ///
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR", env = "FETCH_DEPS_ROOT")]
    pub root: Option<PathBuf>,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let Some(path) = manifest::find_manifest(&root) else {
        println!(
            "{} No manifest found in {}",
            emoji(&out, "❌", "[ERR]"),
            root.display()
        );
        return Err(anyhow::anyhow!("No manifest found in {}", root.display()));
    };

    println!(
        "{} Validating manifest: {}",
        emoji(&out, "🔍", "[SCAN]"),
        path.display()
    );

    let manifest = match manifest::from_file(&path) {
        Ok(manifest) => {
            println!(
                "{} Manifest parsed successfully",
                emoji(&out, "✅", "[OK]")
            );
            manifest
        }
        Err(e) => {
            println!(
                "{} Manifest parsing failed: {}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(anyhow::anyhow!("Manifest parsing failed: {}", e));
        }
    };

    println!("\n{} Manifest Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Features: {}", manifest.features.len());
    for feature in &manifest.features {
        println!(
            "     {}: {} dependencies",
            feature.name,
            feature.dependencies.len()
        );
    }
    println!("   Total dependencies: {}", manifest.dependency_count());

    println!(
        "\n{} Checking for conflicting dependencies...",
        emoji(&out, "🔄", "[CHECK]")
    );
    let conflicts = find_conflicts(&manifest);
    if conflicts.is_empty() {
        println!("{} No conflicts detected", emoji(&out, "✅", "[OK]"));
        println!("\n{} Manifest is valid", emoji(&out, "🎉", "[DONE]"));
        return Ok(());
    }

    for conflict in &conflicts {
        println!("{} {}", emoji(&out, "❌", "[ERR]"), conflict);
    }
    Err(anyhow::anyhow!(
        "Validation failed with {} conflicting dependencies",
        conflicts.len()
    ))
}

/// Runs every declared dependency through a conflict registry, as a
/// resolution enabling all features would, and collects the rejections.
fn find_conflicts(manifest: &Manifest) -> Vec<String> {
    let mut registry = ConflictRegistry::new();
    manifest
        .features
        .iter()
        .flat_map(|feature| feature.dependencies.iter())
        .filter_map(|edge| registry.accept(&edge.to_record()).err())
        .map(|e| e.to_string())
        .collect()
}
