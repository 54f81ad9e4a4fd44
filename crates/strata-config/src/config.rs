//! High-level configuration structure for strata.
//!
//! A [`StrataConfig`] is the authored, auditable table of variants plus the
//! explicit layer enumerations they are checked against. For file discovery,
//! see the `discovery` module.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result as ConfigResult};
use crate::helpers::{default_minify, default_package, default_root, default_true};
use crate::settings::GlobalSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrataConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    /// Named layers, each an explicit module enumeration.
    #[serde(default)]
    pub layers: IndexMap<String, LayerConfig>,

    #[serde(default)]
    pub variants: Vec<VariantConfig>,

    #[serde(default)]
    pub settings: GlobalSettings,

    /// Directory the config was loaded from. Relative project paths are
    /// anchored here.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Source root. Entries and layer modules are relative to it.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Location of the package manifest supplying declared externals.
    #[serde(default = "default_package")]
    pub package: PathBuf,

    /// Packages recognised as external in addition to the manifest's
    /// dependencies (e.g. node built-ins).
    #[serde(default)]
    pub additional_externals: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            package: default_package(),
            additional_externals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Module paths relative to the project root, with or without extension.
    #[serde(default)]
    pub modules: Vec<String>,
}

/// How a variant is checked against its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnforcementMode {
    /// Layer modules must never be reached.
    ForbidLayer,
    /// Only layer modules are bundled; everything else stays external.
    AllowOnlyLayer,
    #[default]
    Unrestricted,
}

impl EnforcementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementMode::ForbidLayer => "forbid-layer",
            EnforcementMode::AllowOnlyLayer => "allow-only-layer",
            EnforcementMode::Unrestricted => "unrestricted",
        }
    }

    /// Whether this mode needs a layer to be checked against.
    pub fn requires_layer(&self) -> bool {
        !matches!(self, EnforcementMode::Unrestricted)
    }
}

impl std::fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,

    /// Entry module, relative to the project root.
    pub entry: PathBuf,

    #[serde(default)]
    pub mode: EnforcementMode,

    #[serde(default)]
    pub layer: Option<String>,

    /// Specifier emitted in place of externalised project modules.
    #[serde(default)]
    pub external_alias: Option<String>,

    #[serde(default)]
    pub transform: TransformConfig,

    #[serde(default)]
    pub outputs: Vec<OutputTarget>,
}

/// Output format for bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CommonJS bundle
    Cjs,
    /// ECMAScript module bundle
    #[serde(alias = "es")]
    Esm,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Cjs => "cjs",
            OutputFormat::Esm => "esm",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTarget {
    pub format: OutputFormat,

    /// Output file relative to the config directory.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Name of a `package.json` field holding the output file.
    #[serde(default)]
    pub package_field: Option<String>,

    #[serde(default = "default_true")]
    pub sourcemap: bool,
}

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Browser,
    Node,
}

/// Target ECMAScript version for transpilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EsTarget {
    ES5,
    ES2015,
    #[default]
    ES2017,
    ES2020,
    ES2022,
    ESNext,
}

impl EsTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            EsTarget::ES5 => "es5",
            EsTarget::ES2015 => "es2015",
            EsTarget::ES2017 => "es2017",
            EsTarget::ES2020 => "es2020",
            EsTarget::ES2022 => "es2022",
            EsTarget::ESNext => "esnext",
        }
    }
}

/// Language-transform settings for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub target: EsTarget,

    #[serde(default)]
    pub platform: Platform,

    /// One of `none`, `whitespace`, `syntax`, `identifiers`.
    #[serde(default = "default_minify")]
    pub minify: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            target: EsTarget::default(),
            platform: Platform::default(),
            minify: default_minify(),
        }
    }
}

impl StrataConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use strata_config::{EnforcementMode, StrataConfig};
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "layers": { "persistence": { "modules": ["local/simple_db"] } },
    ///     "variants": [{
    ///         "name": "lite",
    ///         "entry": "index.ts",
    ///         "mode": "forbid-layer",
    ///         "layer": "persistence"
    ///     }]
    /// });
    ///
    /// let config = StrataConfig::from_value(value).unwrap();
    /// assert_eq!(config.variants[0].mode, EnforcementMode::ForbidLayer);
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Absolute (or base-relative) source root.
    pub fn root_dir(&self) -> PathBuf {
        anchor(&self.base_dir, &self.project.root)
    }

    pub fn package_path(&self) -> PathBuf {
        anchor(&self.base_dir, &self.project.package)
    }

    pub fn entry_path(&self, variant: &VariantConfig) -> PathBuf {
        anchor(&self.root_dir(), &variant.entry)
    }

    pub fn variant(&self, name: &str) -> Option<&VariantConfig> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Keep only the named variants, preserving table order.
    ///
    /// An empty selection keeps every variant. Unknown names are an error so a
    /// typo never silently skips a build.
    pub fn select_variants(mut self, names: &[String]) -> ConfigResult<Self> {
        if names.is_empty() {
            return Ok(self);
        }

        for name in names {
            if self.variant(name).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "variant".to_string(),
                    hint: Some(format!(
                        "unknown variant '{}'; declared: {}",
                        name,
                        self.variants
                            .iter()
                            .map(|v| v.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
                });
            }
        }

        self.variants.retain(|v| names.contains(&v.name));
        Ok(self)
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "project": { "root": "src", "additional_externals": ["util"] },
            "layers": {
                "persistence": { "modules": ["local/simple_db", "api/persistence"] }
            },
            "variants": [
                {
                    "name": "lite",
                    "entry": "index.ts",
                    "mode": "forbid-layer",
                    "layer": "persistence",
                    "outputs": [
                        { "format": "cjs", "file": "dist/index.cjs.js" },
                        { "format": "es", "file": "dist/index.esm.js", "sourcemap": false }
                    ]
                },
                {
                    "name": "persistence",
                    "entry": "index.persistence.ts",
                    "mode": "allow-only-layer",
                    "layer": "persistence",
                    "external_alias": "pkg/thick-client",
                    "transform": { "target": "es5", "minify": "identifiers" }
                }
            ]
        })
    }

    #[test]
    fn from_value_creates_config() {
        let config = StrataConfig::from_value(sample()).unwrap();
        assert_eq!(config.variants.len(), 2);
        assert_eq!(config.layers["persistence"].modules.len(), 2);
        assert_eq!(config.project.additional_externals, vec!["util"]);

        let lite = config.variant("lite").unwrap();
        assert_eq!(lite.mode, EnforcementMode::ForbidLayer);
        assert_eq!(lite.outputs[1].format, OutputFormat::Esm);
        assert!(lite.outputs[0].sourcemap);
        assert!(!lite.outputs[1].sourcemap);
        assert_eq!(lite.transform, TransformConfig::default());

        let persistence = config.variant("persistence").unwrap();
        assert_eq!(persistence.mode, EnforcementMode::AllowOnlyLayer);
        assert_eq!(persistence.transform.target, EsTarget::ES5);
        assert_eq!(persistence.external_alias.as_deref(), Some("pkg/thick-client"));
    }

    #[test]
    fn mode_defaults_to_unrestricted() {
        let config = StrataConfig::from_value(json!({
            "variants": [{ "name": "all", "entry": "index.ts" }]
        }))
        .unwrap();
        assert_eq!(config.variants[0].mode, EnforcementMode::Unrestricted);
        assert!(!config.variants[0].mode.requires_layer());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result = StrataConfig::from_value(json!({
            "variants": [{ "name": "x", "entry": "index.ts", "mode": "forbid-everything" }]
        }));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn paths_are_anchored_at_base_dir() {
        let config = StrataConfig::from_value(sample())
            .unwrap()
            .with_base_dir("/work/pkg");
        assert_eq!(config.root_dir(), PathBuf::from("/work/pkg/src"));
        assert_eq!(config.package_path(), PathBuf::from("/work/pkg/package.json"));
        let lite = config.variant("lite").unwrap();
        assert_eq!(config.entry_path(lite), PathBuf::from("/work/pkg/src/index.ts"));
    }

    #[test]
    fn select_variants_keeps_table_order() {
        let config = StrataConfig::from_value(sample()).unwrap();
        let selected = config
            .select_variants(&["persistence".to_string(), "lite".to_string()])
            .unwrap();
        let names: Vec<_> = selected.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["lite", "persistence"]);
    }

    #[test]
    fn select_variants_rejects_unknown_name() {
        let config = StrataConfig::from_value(sample()).unwrap();
        let err = config.select_variants(&["thick".to_string()]).unwrap_err();
        assert!(err.to_string().contains("variant"));
        assert!(err.hint().unwrap().contains("unknown variant 'thick'"));
    }

    #[test]
    fn to_value_round_trips_modes() {
        let config = StrataConfig::from_value(sample()).unwrap();
        let value = config.to_value().unwrap();
        assert_eq!(value["variants"][1]["mode"], json!("allow-only-layer"));
    }
}
