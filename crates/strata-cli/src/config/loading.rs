use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::Serialize;
use strata_bundler::LogLevel;
use strata_config::{CONFIG_FILE_NAME, ConfigDiscovery, ConfigError, GlobalSettings, StrataConfig};

use crate::error::{CliError, Result};

/// Load the config from `path`, or discover it in the working directory.
pub fn load_config(path: Option<&Path>) -> Result<StrataConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::ConfigNotFound(path.to_path_buf()));
            }
            Ok(strata_config::load_from(path)?)
        }
        None => {
            let cwd = std::env::current_dir()?;
            ConfigDiscovery::new(&cwd).load().map_err(|e| match e {
                ConfigError::NotFound => CliError::ConfigNotFound(cwd.join(CONFIG_FILE_NAME)),
                other => other.into(),
            })
        }
    }
}

/// Settings given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_jobs: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

const SETTINGS_HINT: &str = "Check [settings] in strata.toml and STRATA_* environment variables";

/// Global settings after layering, with the log level parsed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub parallel_jobs: Option<usize>,
    pub log_level: Option<LogLevel>,
}

/// Layer global settings.
///
/// Priority: flags > `STRATA_*` environment variables > config file.
///
/// # Errors
///
/// [`CliError::InvalidSetting`] when a layer holds a value of the wrong type
/// or an unknown log level.
pub fn resolve_settings(
    file: &GlobalSettings,
    overrides: &SettingsOverrides,
) -> Result<ResolvedSettings> {
    let figment = Figment::new()
        .merge(Serialized::defaults(file))
        .merge(Env::prefixed("STRATA_").split("__"))
        .merge(Serialized::defaults(overrides));

    let settings: GlobalSettings = figment.extract().map_err(|e| CliError::InvalidSetting {
        field: e.path.join("."),
        message: e.kind.to_string(),
        hint: SETTINGS_HINT.to_string(),
    })?;

    let log_level = settings
        .log_level
        .as_deref()
        .map(str::parse::<LogLevel>)
        .transpose()
        .map_err(|e| CliError::InvalidSetting {
            field: "log_level".to_string(),
            message: e.to_string(),
            hint: SETTINGS_HINT.to_string(),
        })?;

    Ok(ResolvedSettings {
        parallel_jobs: settings.parallel_jobs,
        log_level,
    })
}
