//! File-based config discovery for CLI use
//!
//! Handles finding and loading strata configuration files from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::StrataConfig;
use crate::error::{ConfigError, Result};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// File-based configuration discovery
///
/// Searches for strata configuration files in conventional locations and loads
/// them. Library users should use `StrataConfig::from_value()` directly.
///
/// # Example
///
/// ```no_run
/// use strata_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. TOML config: strata.toml
    /// 2. package.json (strata field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join(CONFIG_FILE_NAME);
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("strata").is_some_and(|v| !v.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<StrataConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        load_from(&path)
    }
}

/// Load config from a specific file path.
///
/// The config's base directory is set to the file's parent directory.
pub fn load_from(path: &Path) -> Result<StrataConfig> {
    let value = read_value(path)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(StrataConfig::from_value(value)?.with_base_dir(base_dir))
}

/// Read a config file into a JSON value without deserializing it.
pub fn read_value(path: &Path) -> Result<Value> {
    if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
        return read_package_json(path);
    }

    let content = fs::read_to_string(path)?;

    let toml_val: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
        field: "toml".to_string(),
        hint: Some(format!("Invalid TOML syntax: {}", e)),
    })?;

    serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
        field: "toml".to_string(),
        hint: Some(format!("TOML to JSON conversion failed: {}", e)),
    })
}

fn read_package_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;

    let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {}", e)),
    })?;

    match parsed.get("strata") {
        Some(value) if !value.is_null() => Ok(value.clone()),
        Some(_) => Err(ConfigError::InvalidValue {
            field: "strata".to_string(),
            hint: Some("The 'strata' field cannot be null".to_string()),
        }),
        None => Err(ConfigError::InvalidValue {
            field: "strata".to_string(),
            hint: Some("Add a 'strata' field to your package.json".to_string()),
        }),
    }
}

/// Discover and load config from current directory (convenience function)
pub fn discover() -> Result<StrataConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}
