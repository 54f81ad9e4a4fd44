//! Logging infrastructure for the strata CLI.
//!
//! The subscriber is installed once from the global flags. When neither
//! `--verbose` nor `--quiet` nor `RUST_LOG` decides the level, the filter stays
//! reloadable so `settings.log_level` from the config can still apply once the
//! config has been read.

use std::sync::OnceLock;

use strata_bundler::LogLevel;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

static RELOAD: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Initialize the tracing subscriber.
///
/// Precedence: `--verbose` (debug), `--quiet` (errors only), `RUST_LOG`, then
/// info until [`apply_config_level`] says otherwise.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let (filter, reloadable) = if verbose {
        (LogLevel::Debug.env_filter(), false)
    } else if quiet {
        (LogLevel::Error.env_filter(), false)
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => (filter, false),
            Err(_) => (LogLevel::Info.env_filter(), true),
        }
    };

    let (filter_layer, handle) = reload::Layer::new(filter);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .without_time()
        .compact();

    if tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .is_ok()
        && reloadable
    {
        let _ = RELOAD.set(handle);
    }
}

/// Apply `settings.log_level` from the config.
///
/// No-op when the level was fixed by a flag or `RUST_LOG`.
pub fn apply_config_level(level: LogLevel) {
    let Some(handle) = RELOAD.get() else {
        return;
    };
    if let Err(e) = handle.reload(level.env_filter()) {
        tracing::warn!("could not apply log level '{level}': {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_without_reloadable_filter_is_noop() {
        apply_config_level(LogLevel::Warn);
    }
}
