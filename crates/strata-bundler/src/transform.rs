//! Language-transform settings applied to each variant.

use std::fmt;

use rolldown::Platform;

use crate::{Error, Result};

/// Validated minification level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinifyLevel {
    /// No minification - output readable code.
    #[default]
    None,
    /// Remove whitespace and comments only.
    Whitespace,
    /// Syntax-level optimizations (property names preserved).
    Syntax,
    /// Full minification including identifier mangling.
    Identifiers,
}

impl MinifyLevel {
    /// Parse a minification level from a string.
    ///
    /// Values are case-insensitive; `"false"` and `"true"` are accepted as
    /// aliases for `none` and `identifiers`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_bundler::MinifyLevel;
    ///
    /// assert_eq!(MinifyLevel::parse("none").unwrap(), MinifyLevel::None);
    /// assert_eq!(MinifyLevel::parse("IDENTIFIERS").unwrap(), MinifyLevel::Identifiers);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(Self::None),
            "whitespace" => Ok(Self::Whitespace),
            "syntax" => Ok(Self::Syntax),
            "identifiers" | "true" => Ok(Self::Identifiers),
            _ => Err(Error::Configuration(format!(
                "Invalid minify level: '{}'. Expected: none, whitespace, syntax, identifiers",
                s
            ))),
        }
    }

    /// Rolldown only exposes boolean minification, so every enabled level
    /// maps to `true`.
    pub(crate) fn to_rolldown_options(self) -> Option<rolldown::RawMinifyOptions> {
        match self {
            Self::None => None,
            Self::Whitespace | Self::Syntax | Self::Identifiers => {
                Some(rolldown::RawMinifyOptions::from(true))
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for MinifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Whitespace => write!(f, "whitespace"),
            Self::Syntax => write!(f, "syntax"),
            Self::Identifiers => write!(f, "identifiers"),
        }
    }
}

/// ECMAScript language level a variant is compiled down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EsTarget {
    Es5,
    Es2015,
    #[default]
    Es2017,
    Es2020,
    Es2022,
    EsNext,
}

impl EsTarget {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "es5" => Ok(Self::Es5),
            "es2015" | "es6" => Ok(Self::Es2015),
            "es2017" => Ok(Self::Es2017),
            "es2020" => Ok(Self::Es2020),
            "es2022" => Ok(Self::Es2022),
            "esnext" => Ok(Self::EsNext),
            _ => Err(Error::Configuration(format!(
                "Invalid target: '{}'. Expected: es5, es2015, es2017, es2020, es2022, esnext",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es5 => "es5",
            Self::Es2015 => "es2015",
            Self::Es2017 => "es2017",
            Self::Es2020 => "es2020",
            Self::Es2022 => "es2022",
            Self::EsNext => "esnext",
        }
    }

    /// Target string for Rolldown's transformer. `EsNext` leaves syntax as
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for `es5`: the transformer lowers no
    /// further than es2015.
    pub fn to_rolldown_target(self) -> Result<Option<String>> {
        match self {
            Self::Es5 => Err(Error::Configuration(
                "target 'es5' is not supported: the lowest target is es2015".into(),
            )),
            Self::EsNext => Ok(None),
            other => Ok(Some(other.as_str().to_string())),
        }
    }
}

impl fmt::Display for EsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-variant transform settings handed to the bundler.
#[derive(Debug, Clone)]
pub struct TransformSettings {
    pub target: EsTarget,
    pub platform: Platform,
    pub minify: MinifyLevel,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            target: EsTarget::default(),
            platform: Platform::Browser,
            minify: MinifyLevel::None,
        }
    }
}
