//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for
//! library use). Both run before any bundling work starts.

use std::collections::HashSet;

use crate::config::{EnforcementMode, EsTarget, OutputFormat, StrataConfig};
use crate::error::{ConfigError, Result};

const MINIFY_LEVELS: &[&str] = &["none", "false", "whitespace", "syntax", "identifiers", "true"];

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &StrataConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use strata_config::{ConfigValidator, SchemaValidator, StrataConfig};
/// use serde_json::json;
///
/// let config = StrataConfig::from_value(json!({
///     "variants": [{
///         "name": "all",
///         "entry": "index.ts",
///         "outputs": [
///             { "format": "cjs", "file": "dist/index.cjs.js" },
///             { "format": "esm", "file": "dist/index.esm.js" }
///         ]
///     }]
/// })).unwrap();
///
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &StrataConfig) -> Result<()> {
        if config.variants.is_empty() {
            return Err(ConfigError::NoVariants);
        }

        for (name, layer) in &config.layers {
            if layer.modules.is_empty() {
                return Err(ConfigError::EmptyLayer(name.clone()));
            }
            if layer.modules.iter().any(|m| m.trim().is_empty()) {
                return Err(ConfigError::SchemaValidation {
                    message: format!("layer '{}' contains an empty module path", name),
                    hint: Some("Remove empty strings from the 'modules' array".to_string()),
                });
            }
        }

        for external in &config.project.additional_externals {
            if external.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "external package names cannot be empty".to_string(),
                    hint: Some(
                        "Remove empty strings from the 'additional_externals' array".to_string(),
                    ),
                });
            }
        }

        if config.settings.parallel_jobs == Some(0) {
            return Err(ConfigError::SchemaValidation {
                message: "parallel_jobs must be at least 1".to_string(),
                hint: Some("Omit parallel_jobs to use the CPU count".to_string()),
            });
        }

        let mut seen = HashSet::new();
        for variant in &config.variants {
            if variant.name.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "variant names cannot be empty".to_string(),
                    hint: None,
                });
            }
            if !seen.insert(variant.name.as_str()) {
                return Err(ConfigError::DuplicateVariant(variant.name.clone()));
            }

            match (&variant.layer, variant.mode.requires_layer()) {
                (None, true) => {
                    return Err(ConfigError::MissingLayer {
                        variant: variant.name.clone(),
                        mode: variant.mode.to_string(),
                    });
                }
                (Some(layer), _) if !config.layers.contains_key(layer) => {
                    return Err(ConfigError::UnknownLayer {
                        variant: variant.name.clone(),
                        layer: layer.clone(),
                    });
                }
                _ => {}
            }

            if variant.external_alias.is_some()
                && variant.mode != EnforcementMode::AllowOnlyLayer
            {
                return Err(ConfigError::SchemaValidation {
                    message: format!(
                        "variant '{}' sets external_alias but uses mode '{}'",
                        variant.name, variant.mode
                    ),
                    hint: Some(
                        "external_alias only applies to allow-only-layer variants".to_string(),
                    ),
                });
            }

            if variant.mode == EnforcementMode::AllowOnlyLayer && variant.external_alias.is_none() {
                return Err(ConfigError::SchemaValidation {
                    message: format!(
                        "variant '{}' uses mode 'allow-only-layer' without external_alias",
                        variant.name
                    ),
                    hint: Some(
                        "set external_alias to the package path that re-exports the modules kept outside the layer"
                            .to_string(),
                    ),
                });
            }

            if variant.transform.target == EsTarget::ES5 {
                return Err(ConfigError::InvalidValue {
                    field: format!("variants.{}.transform.target", variant.name),
                    hint: Some("es5 is not supported; the lowest target is es2015".to_string()),
                });
            }

            let minify = variant.transform.minify.to_lowercase();
            if !MINIFY_LEVELS.contains(&minify.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("variants.{}.transform.minify", variant.name),
                    hint: Some(format!(
                        "'{}' is not one of none, whitespace, syntax, identifiers",
                        variant.transform.minify
                    )),
                });
            }

            for output in &variant.outputs {
                if output.file.is_some() == output.package_field.is_some() {
                    return Err(ConfigError::SchemaValidation {
                        message: format!(
                            "variant '{}' {} output must set exactly one of 'file' or 'package_field'",
                            variant.name, output.format
                        ),
                        hint: None,
                    });
                }
            }

            for format in [OutputFormat::Cjs, OutputFormat::Esm] {
                if !variant.outputs.iter().any(|o| o.format == format) {
                    return Err(ConfigError::MissingFormat {
                        variant: variant.name.clone(),
                        format: format.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Validates that the source root and every variant entry point exist.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &StrataConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        let root = config.root_dir();
        if !root.is_dir() {
            return Err(ConfigError::RootNotFound(root));
        }

        for variant in &config.variants {
            let path = config.entry_path(variant);
            if !path.is_file() {
                return Err(ConfigError::EntryNotFound {
                    variant: variant.name.clone(),
                    path,
                });
            }
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &StrataConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &StrataConfig) -> Result<()> {
    FsValidator.validate(config)
}
