//! Configuration handling for the CLI.
//!
//! - [`loading`] finds the config file and layers global settings with figment
//!   (file, then `STRATA_*` environment variables, then flags).
//! - [`conversions`] turns the authored config plus package metadata into a
//!   [`strata_bundler::BuildPlan`].

pub mod conversions;
pub mod loading;

pub use conversions::build_plan;
pub use loading::{ResolvedSettings, SettingsOverrides, load_config, resolve_settings};
