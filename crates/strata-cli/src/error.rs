//! Error handling for the strata CLI.
//!
//! [`CliError`] wraps the library errors (`strata_config::ConfigError`,
//! `strata_bundler::Error`) and adds the failures only the CLI can observe,
//! such as a build in which some variants failed. `main` renders it through
//! [`cli_error_to_miette`].

mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Config loading, parsing or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] strata_config::ConfigError),

    /// Plan construction or a bundler failure outside a single variant
    #[error(transparent)]
    Bundler(#[from] strata_bundler::Error),

    /// No config file where one was expected
    #[error("Config file not found: {}\n\nHint: Create a strata.toml file or specify --config <path>", .0.display())]
    ConfigNotFound(PathBuf),

    /// A layered setting (file, environment or flag) has the wrong type
    #[error("Invalid value for setting '{field}': {message}\n\nHint: {hint}")]
    InvalidSetting {
        field: String,
        message: String,
        hint: String,
    },

    /// At least one variant failed; the others may have been written
    #[error("{failed} of {total} variant(s) failed")]
    BuildFailed { failed: usize, total: usize },

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
