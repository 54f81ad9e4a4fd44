//! Package metadata (`package.json`) supplying declared externals and output
//! file paths.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Maximum allowed size for package.json files (10MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

/// Read-only view of a package manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: Option<String>,

    #[serde(default)]
    pub dependencies: Map<String, Value>,

    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: Map<String, Value>,

    /// Every other top-level field, used for output path lookups.
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// File path this was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

impl PackageMetadata {
    /// Load a manifest from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        if metadata.len() > MAX_PACKAGE_JSON_SIZE {
            return Err(ConfigError::PackageMetadata {
                path: path.to_path_buf(),
                message: format!(
                    "exceeds maximum size of {}MB",
                    MAX_PACKAGE_JSON_SIZE / 1024 / 1024
                ),
            });
        }

        let content = fs::read_to_string(path)?;
        let mut pkg = Self::from_json(&content).map_err(|e| ConfigError::PackageMetadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        pkg.path = path.to_path_buf();
        Ok(pkg)
    }

    /// Load a manifest if it exists; a missing file yields empty metadata.
    pub fn from_path_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "package manifest not found; no declared externals"
            );
            return Ok(Self {
                path: path.to_path_buf(),
                ..Default::default()
            });
        }
        Self::from_path(path)
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Declared external package names (`dependencies` ∪ `peerDependencies`),
    /// sorted and deduplicated.
    pub fn external_packages(&self) -> Vec<String> {
        self.dependencies
            .keys()
            .chain(self.peer_dependencies.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// String value of a top-level field such as `main`, `module` or
    /// `browserThickClient`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}
