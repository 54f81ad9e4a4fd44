#![cfg_attr(docsrs, feature(doc_cfg))]

//! # strata-bundler
//!
//! Layer-enforcing multi-variant bundling on top of Rolldown.
//!
//! One source tree produces several bundle variants. Each variant carries a
//! policy describing which architectural layer it may (or may not) compile
//! in. Every import edge the bundler discovers is classified against that
//! policy and either inlined, left external, or rejected with a
//! [`Error::LayerViolation`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use strata_bundler::{
//!     BuildPlan, EnforcementMode, ExecuteOptions, OutputFormat, OutputSpec, RolldownBundler,
//!     VariantPlan, execute,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = BuildPlan::new("./src", ".")
//!     .layer("persistence", ["local/simple_db", "api/persistence"])?
//!     .externals(["tslib", "@firebase/util"])
//!     .variant(
//!         VariantPlan::new("lite", "index.ts")
//!             .mode(EnforcementMode::ForbidLayer)
//!             .layer("persistence")
//!             .output(OutputSpec::new(OutputFormat::Cjs, "dist/index.cjs.js"))
//!             .output(OutputSpec::new(OutputFormat::Esm, "dist/index.esm.js")),
//!     );
//!
//! let report = execute(Arc::new(plan), Arc::new(RolldownBundler::new()), ExecuteOptions::default()).await?;
//! assert!(report.is_success());
//! # Ok(()) }
//! ```

pub mod boundary_plugin;
pub mod bundler;
pub mod diagnostics;
pub mod enforcer;
pub mod executor;
pub mod interceptor;
pub mod layer;
pub mod output;
pub mod plan;
pub mod resolver;
pub mod rolldown_bundler;
pub mod transform;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::LogLevel;

pub use bundler::{Artifact, BundleRequest, Bundler, OutputFormat, OutputSpec};
pub use enforcer::{
    BoundaryEnforcer, EdgeClassifier, EnforcementMode, ImportEdge, Verdict, VariantPolicy,
    ViolationReport,
};
pub use executor::{BuildReport, ExecuteOptions, VariantOutcome, execute};
pub use interceptor::{
    BoundaryInterceptor, EdgeDecision, ExternalPackages, ImportInterceptor, SharedInterceptor,
};
pub use output::{WrittenFile, write_artifacts};
pub use layer::LayerSet;
pub use plan::{BuildPlan, VariantPlan};
pub use resolver::{ModuleIdentity, ModulePathResolver, ResolveError};
pub use boundary_plugin::BoundaryPlugin;
pub use rolldown_bundler::RolldownBundler;
pub use transform::{EsTarget, MinifyLevel, TransformSettings};

// Re-export the Rolldown platform type used in transform settings
pub use rolldown::Platform;

/// Error types for strata-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An import could not be mapped to a project module or a recognised
    /// external package.
    #[error(
        "Resolution ambiguity in variant '{variant}': cannot resolve '{specifier}' from {importer}: {reason}"
    )]
    ResolutionAmbiguity {
        variant: String,
        specifier: String,
        importer: String,
        reason: String,
    },

    /// An import edge broke its variant's layering policy.
    #[error("Layer violation: {0}")]
    LayerViolation(ViolationReport),

    /// The build plan is inconsistent; detected before any traversal.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from the bundler backend.
    #[error("Bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),
}

/// Result type alias for strata-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a Rolldown error.
    ///
    /// Extracts structured diagnostics from Rolldown's error types.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown_error(error))
    }
}

/// Format bundler error diagnostics for display.
fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    match diagnostics {
        [] => "Unknown bundler error".to_string(),
        [diag] => format!("{}: {}", diag.kind, diag.message),
        _ => format!(
            "{} errors: {}",
            diagnostics.len(),
            diagnostics
                .iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::ResolutionAmbiguity { .. } => "RESOLUTION_AMBIGUITY",
            Error::LayerViolation(_) => "LAYER_VIOLATION",
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::ResolutionAmbiguity { .. } => Some(Box::new(
                "Relative imports must point at an existing source file; bare imports must be \
                 declared in package.json (dependencies or peerDependencies) or listed in \
                 project.additional_externals.",
            )),
            Error::LayerViolation(report) => Some(Box::new(format!(
                "Variant '{}' must not compile in modules of layer '{}'. Remove the import from \
                 {} or move the shared code out of the layer.",
                report.variant, report.layer, report.importer
            ))),
            Error::Configuration(msg) => Some(Box::new(format!(
                "Check your strata configuration.\nError: {}",
                msg
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it's within the project directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::Bundler(diagnostics) => {
                if diagnostics.len() == 1 {
                    diagnostics[0]
                        .help
                        .as_ref()
                        .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>)
                } else {
                    Some(Box::new(
                        "Multiple bundler errors occurred. See details below.".to_string(),
                    ))
                }
            }
            Error::Io(_) => None,
        }
    }
}
