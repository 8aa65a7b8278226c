//! The on-disk workspace that receives fetched dependencies.
//!
//! A workspace is a single directory holding one subdirectory per
//! dependency, named exactly after the dependency.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Opens the workspace at `root`, creating the directory if needed.
    ///
    /// Fails with [`Error::WorkspaceCollision`] if `root` exists and is not a
    /// directory.
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(Error::WorkspaceCollision { path: root }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("creating workspace {}", root.display());
                fs::create_dir_all(&root)?;
            }
            Err(e) => return Err(Error::Io(e)),
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that holds the dependency called `name`.
    pub fn dependency_dir(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

/// Accepts only names that are exactly one normal path component.
pub fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => Ok(()),
        _ => Err(Error::InvalidDependencyName {
            name: name.to_string(),
        }),
    }
}
