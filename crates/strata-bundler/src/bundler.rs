//! The bundler capability that variant builds delegate to.
//!
//! A [`Bundler`] walks the import graph of one entry point, consults the
//! supplied interceptor for every edge, and returns one [`Artifact`] per
//! requested output. It never writes to disk; the executor does that once the
//! whole variant has succeeded.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::interceptor::SharedInterceptor;
use crate::transform::TransformSettings;

/// Module format of one output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CommonJS.
    Cjs,
    /// ES module.
    Esm,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Cjs => "cjs",
            OutputFormat::Esm => "esm",
        }
    }

    pub(crate) fn to_rolldown(self) -> rolldown::OutputFormat {
        match self {
            OutputFormat::Cjs => rolldown::OutputFormat::Cjs,
            OutputFormat::Esm => rolldown::OutputFormat::Esm,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub format: OutputFormat,
    /// Path relative to the plan's output base directory.
    pub file: PathBuf,
    /// Emit `<file>.map` next to the artifact.
    pub sourcemap: bool,
}

impl OutputSpec {
    pub fn new(format: OutputFormat, file: impl Into<PathBuf>) -> Self {
        Self {
            format,
            file: file.into(),
            sourcemap: true,
        }
    }

    pub fn sourcemap(mut self, enabled: bool) -> Self {
        self.sourcemap = enabled;
        self
    }
}

/// Everything a backend needs to build one variant.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    pub variant: String,
    /// Absolute entry file.
    pub entry: PathBuf,
    /// Absolute source root.
    pub root: PathBuf,
    pub outputs: Vec<OutputSpec>,
    pub transform: TransformSettings,
}

/// Generated code for one output, not yet written.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: OutputFormat,
    /// Destination relative to the output base directory.
    pub file: PathBuf,
    pub code: String,
    /// Source map JSON, when requested.
    pub map: Option<String>,
}

/// Bundling backend.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Bundle `request.entry` once per output. Any interceptor error aborts
    /// the whole request.
    async fn bundle(
        &self,
        request: BundleRequest,
        interceptor: SharedInterceptor,
    ) -> Result<Vec<Artifact>>;
}
