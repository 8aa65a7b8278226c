//! # Manifest Schema and Parsing
//!
//! This module defines the in-memory form of a directory's `repository.*`
//! manifest and the readers that load it. A manifest is an ordered list of
//! named features, each listing the dependency edges it contributes when the
//! feature is enabled.
//!
//! ## Formats
//!
//! Two on-disk formats are understood, tried in the order given by
//! [`MANIFEST_FILE_NAMES`]:
//!
//! 1.  **XML** (`repository.xml`):
//!
//!     ```xml
//!     <repository>
//!       <feature name="main">
//!         <dependency name="foo" url="https://example.com/foo.git" revision="r1"/>
//!       </feature>
//!       <feature name="extra">
//!         <dependency name="bar" url="../bar.git" features="docs,cli"/>
//!       </feature>
//!     </repository>
//!     ```
//!
//! 2.  **YAML** (`repository.yaml` / `repository.yml`):
//!
//!     ```yaml
//!     features:
//!       - name: main
//!         dependencies:
//!           - { name: foo, url: "https://example.com/foo.git", revision: r1 }
//!     ```
//!
//! Both formats also accept dependencies declared outside of any feature,
//! the older featureless layout. Those edges belong to the implicit `main`
//! feature.
//!
//! ## Readers
//!
//! The resolver only depends on the [`ManifestReader`] trait. The
//! [`FsManifestReader`] reads from disk; the [`MemoryManifestReader`] serves
//! manifests from a map and is used by tests and benchmarks.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xot::Xot;

use crate::defaults::{DEFAULT_REVISION, MAIN_FEATURE, MANIFEST_FILE_NAMES};
use crate::error::{Error, Result};
use crate::resolve::DependencyRecord;

/// A single dependency declaration inside a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyEdge {
    /// Dependency name, also the name of its workspace directory.
    pub name: String,
    /// Where to clone the dependency from.
    #[serde(rename = "url")]
    pub location: String,
    /// Pinned revision. Missing or empty means [`DEFAULT_REVISION`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Comma-separated features of the dependency to enable.
    #[serde(default, rename = "features", skip_serializing_if = "Option::is_none")]
    pub child_features: Option<String>,
}

impl DependencyEdge {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            revision: None,
            child_features: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_features(mut self, features: impl Into<String>) -> Self {
        self.child_features = Some(features.into());
        self
    }

    /// The revision to check out, falling back to [`DEFAULT_REVISION`].
    pub fn revision(&self) -> &str {
        match self.revision.as_deref() {
            Some(revision) if !revision.is_empty() => revision,
            _ => DEFAULT_REVISION,
        }
    }

    /// The raw child feature list, empty when none was requested.
    pub fn child_features(&self) -> &str {
        self.child_features.as_deref().unwrap_or("")
    }

    /// The binding this edge asks for, with the revision default applied.
    pub fn to_record(&self) -> DependencyRecord {
        DependencyRecord {
            name: self.name.clone(),
            location: self.location.clone(),
            revision: self.revision().to_string(),
        }
    }
}

/// A named, independently enable-able group of dependency edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,
}

impl Feature {
    pub fn new(name: impl Into<String>, dependencies: Vec<DependencyEdge>) -> Self {
        Self {
            name: name.into(),
            dependencies,
        }
    }
}

/// A directory's ordered list of features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub features: Vec<Feature>,
}

impl Manifest {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Builds a manifest from declared features plus featureless edges.
    ///
    /// Featureless edges go to the front of the `main` feature, which is
    /// created as the first feature when the manifest does not declare it.
    pub fn from_parts(mut features: Vec<Feature>, legacy: Vec<DependencyEdge>) -> Self {
        if legacy.is_empty() {
            return Self { features };
        }

        match features.iter_mut().find(|f| f.name == MAIN_FEATURE) {
            Some(main) => {
                let declared = std::mem::replace(&mut main.dependencies, legacy);
                main.dependencies.extend(declared);
            }
            None => features.insert(0, Feature::new(MAIN_FEATURE, legacy)),
        }

        Self { features }
    }

    /// Feature names in declaration order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Total number of dependency edges across all features.
    pub fn dependency_count(&self) -> usize {
        self.features.iter().map(|f| f.dependencies.len()).sum()
    }
}

/// Loads manifests by directory.
///
/// `Ok(None)` means the directory has no manifest, which is a valid leaf and
/// not an error.
pub trait ManifestReader {
    fn read(&self, dir: &Path) -> Result<Option<Manifest>>;
}

/// Reads `repository.*` manifests from the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestReader;

impl ManifestReader for FsManifestReader {
    fn read(&self, dir: &Path) -> Result<Option<Manifest>> {
        match find_manifest(dir) {
            Some(path) => from_file(&path).map(Some),
            None => Ok(None),
        }
    }
}

/// Serves manifests from memory, keyed by directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestReader {
    manifests: HashMap<PathBuf, Manifest>,
}

impl MemoryManifestReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dir: impl Into<PathBuf>, manifest: Manifest) {
        self.manifests.insert(dir.into(), manifest);
    }

    pub fn with(mut self, dir: impl Into<PathBuf>, manifest: Manifest) -> Self {
        self.insert(dir, manifest);
        self
    }
}

impl ManifestReader for MemoryManifestReader {
    fn read(&self, dir: &Path) -> Result<Option<Manifest>> {
        Ok(self.manifests.get(dir).cloned())
    }
}

/// Returns the first manifest file present in `dir`, if any.
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    MANIFEST_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Parses a manifest file, choosing the format from its extension.
pub fn from_file(path: &Path) -> Result<Manifest> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(parse_error(path, "manifest is not valid UTF-8"));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => parse_yaml(&content, path),
        _ => parse_xml(&content, path),
    }
}

/// Parses the YAML manifest format.
///
/// `path` is only used for error messages.
pub fn parse_yaml(content: &str, path: &Path) -> Result<Manifest> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct YamlManifest {
        #[serde(default)]
        features: Vec<Feature>,
        #[serde(default)]
        dependencies: Vec<DependencyEdge>,
    }

    if content.trim().is_empty() {
        return Ok(Manifest::default());
    }

    let raw: YamlManifest =
        serde_yaml::from_str(content).map_err(|e| parse_error(path, e.to_string()))?;
    Ok(Manifest::from_parts(raw.features, raw.dependencies))
}

/// Parses the XML manifest format.
///
/// `path` is only used for error messages.
pub fn parse_xml(content: &str, path: &Path) -> Result<Manifest> {
    let mut xot = Xot::new();
    let repository = xot.add_name("repository");
    let feature = xot.add_name("feature");
    let dependency = xot.add_name("dependency");
    let attrs = EdgeAttributes {
        name: xot.add_name("name"),
        url: xot.add_name("url"),
        revision: xot.add_name("revision"),
        features: xot.add_name("features"),
    };

    let doc = xot
        .parse(content)
        .map_err(|e| parse_error(path, e.to_string()))?;
    let root = xot
        .document_element(doc)
        .map_err(|e| parse_error(path, e.to_string()))?;

    if xot.element(root).map(|e| e.name()) != Some(repository) {
        return Err(parse_error(path, "root element must be <repository>"));
    }

    let mut features = Vec::new();
    let mut legacy = Vec::new();

    for child in xot.children(root) {
        let Some(element) = xot.element(child) else {
            continue;
        };

        if element.name() == feature {
            let name = xot
                .get_attribute(child, attrs.name)
                .ok_or_else(|| parse_error(path, "<feature> is missing attribute 'name'"))?;

            let mut dependencies = Vec::new();
            for grandchild in xot.children(child) {
                if xot.element(grandchild).map(|e| e.name()) == Some(dependency) {
                    dependencies.push(read_edge(&xot, grandchild, &attrs, path)?);
                }
            }
            features.push(Feature::new(name, dependencies));
        } else if element.name() == dependency {
            legacy.push(read_edge(&xot, child, &attrs, path)?);
        }
    }

    Ok(Manifest::from_parts(features, legacy))
}

struct EdgeAttributes {
    name: xot::NameId,
    url: xot::NameId,
    revision: xot::NameId,
    features: xot::NameId,
}

fn read_edge(
    xot: &Xot,
    node: xot::Node,
    attrs: &EdgeAttributes,
    path: &Path,
) -> Result<DependencyEdge> {
    let required = |id: xot::NameId, attr: &str| {
        xot.get_attribute(node, id).ok_or_else(|| {
            parse_error(
                path,
                format!("<dependency> is missing attribute '{}'", attr),
            )
        })
    };

    Ok(DependencyEdge {
        name: required(attrs.name, "name")?.to_string(),
        location: required(attrs.url, "url")?.to_string(),
        revision: xot.get_attribute(node, attrs.revision).map(str::to_string),
        child_features: xot.get_attribute(node, attrs.features).map(str::to_string),
    })
}

fn parse_error(path: &Path, message: impl Into<String>) -> Error {
    Error::ManifestParse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
