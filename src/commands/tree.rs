//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which resolves and fetches
//! the dependency graph like `fetch` and then displays it hierarchically:
//! every dependency appears under the dependency whose manifest first
//! requested it.
//!
//! ## Functionality
//!
//! - **Dependency Tree Visualization**: Shows who pulled in each dependency
//! - **Depth Control**: Supports `--depth` flag to limit tree depth
//! - **Location and Revision Display**: Shows each dependency's location and
//!   revision

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::borrow::Cow;

use fetch_deps::defaults::ROOT_NAME;
use fetch_deps::resolve::Resolution;

use super::fetch::ResolveArgs;

/// Fetch dependencies and display who requested each of them
#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree.
    /// Use 0 to show only the root, 1 to show its direct dependencies, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs) -> Result<()> {
    let resolution = args.resolve.run()?;

    let tree_root = build_tree(&resolution, args.depth.unwrap_or(usize::MAX));
    print_tree(&tree_root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

/// Builds the display tree rooted at the root manifest.
fn build_tree(resolution: &Resolution, max_depth: usize) -> TreeNode {
    build_tree_node(resolution, ROOT_NAME, ROOT_NAME.to_string(), max_depth, 0)
}

fn build_tree_node(
    resolution: &Resolution,
    name: &str,
    label: String,
    max_depth: usize,
    current_depth: usize,
) -> TreeNode {
    if current_depth >= max_depth {
        return TreeNode {
            label,
            children: vec![],
        };
    }

    let children = resolution
        .fetched
        .iter()
        // A dependency may itself be called "root"; only the real root owns
        // the root's requests.
        .filter(|dep| dep.requested_by == name && (current_depth == 0 || name != ROOT_NAME))
        .map(|dep| {
            let label = format!(
                "{} ({} @ {})",
                dep.record.name, dep.record.location, dep.record.revision
            );
            build_tree_node(
                resolution,
                &dep.record.name,
                label,
                max_depth,
                current_depth + 1,
            )
        })
        .collect();

    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
