//! Log levels for strata's tracing output.
//!
//! Only available with the `logging` feature. Strata emits `tracing` events
//! and never installs a subscriber itself; [`LogLevel::env_filter`] gives
//! applications a filter scoped to the strata crates.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::Error;

/// Crates whose events a strata filter enables.
const CRATES: &[&str] = &["strata_cli", "strata_bundler", "strata_config"];

/// Verbosity of strata's own events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Nothing
    Silent,
    Error,
    Warn,
    /// Variant start/finish and written files (default)
    #[default]
    Info,
    /// Adds per-edge classification
    Debug,
}

impl LogLevel {
    /// Directive value for this level (`off` for [`LogLevel::Silent`]).
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Filter directives enabling this level for the strata crates only.
    pub fn directives(self) -> String {
        CRATES
            .iter()
            .map(|krate| format!("{krate}={}", self.as_filter()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn env_filter(self) -> EnvFilter {
        EnvFilter::new(self.directives())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(Error::Configuration(format!(
                "invalid log level '{s}'. Expected: silent, error, warn, info, debug"
            ))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_from_str() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("off".parse::<LogLevel>().unwrap(), LogLevel::Silent);
        assert_eq!(" DEBUG ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(Error::Configuration(msg)) if msg.contains("'loud'")
        ));
    }

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            LogLevel::Debug.directives(),
            "strata_cli=debug,strata_bundler=debug,strata_config=debug"
        );
        assert_eq!(
            LogLevel::Silent.directives(),
            "strata_cli=off,strata_bundler=off,strata_config=off"
        );
    }

    #[test]
    fn silent_displays_as_off() {
        assert_eq!(LogLevel::Silent.to_string(), "off");
        assert_eq!(LogLevel::default().to_string(), "info");
    }
}
