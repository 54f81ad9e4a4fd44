//! # strata-config
//!
//! Declarative configuration for layered multi-variant builds: the layer
//! enumerations, the variant table and the package metadata they refer to.
//!
//! Library users build a [`StrataConfig`] with [`StrataConfig::from_value`];
//! the CLI discovers `strata.toml` (or a `strata` field in `package.json`)
//! through [`ConfigDiscovery`].

pub mod config;
pub mod discovery;
pub mod error;
pub mod package;
pub mod settings;
pub mod validation;

mod helpers;

pub use config::*;
pub use error::*;
pub use package::PackageMetadata;
pub use settings::*;

pub use discovery::{discover, load_from, ConfigDiscovery, CONFIG_FILE_NAME};
pub use validation::{validate_fs, validate_schema, ConfigValidator, FsValidator, SchemaValidator};
