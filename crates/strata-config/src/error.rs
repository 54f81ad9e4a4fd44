//! Error types for configuration validation and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors (for CLI use)
    #[error("variant '{variant}': entry point not found: {}", .path.display())]
    EntryNotFound { variant: String, path: PathBuf },

    #[error("project root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("invalid config value for '{field}'{}", .hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    // Schema validation errors (no filesystem checks)
    #[error("no variants specified")]
    NoVariants,

    #[error("variant '{0}' is declared more than once")]
    DuplicateVariant(String),

    #[error("variant '{variant}' uses mode '{mode}' but names no layer")]
    MissingLayer { variant: String, mode: String },

    #[error("variant '{variant}' references undefined layer '{layer}'")]
    UnknownLayer { variant: String, layer: String },

    #[error("layer '{0}' enumerates no modules")]
    EmptyLayer(String),

    #[error("variant '{variant}' has no '{format}' output")]
    MissingFormat { variant: String, format: String },

    #[error("variant '{variant}': package.json has no string field '{field}'")]
    PackageField { variant: String, field: String },

    #[error("schema validation failed: {message}")]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    // Package metadata errors
    #[error("invalid package metadata at {}: {message}", .path.display())]
    PackageMetadata { path: PathBuf, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Optional remediation hint carried by some variants.
    pub fn hint(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { hint, .. } | ConfigError::SchemaValidation { hint, .. } => {
                hint.as_deref()
            }
            _ => None,
        }
    }
}
