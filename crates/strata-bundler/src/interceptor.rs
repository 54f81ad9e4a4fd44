//! Per-edge interception installed into every variant build.
//!
//! The bundler backend knows nothing about layers. For each import it
//! discovers it calls [`ImportInterceptor::intercept`] and obeys the returned
//! [`EdgeDecision`], or aborts the variant on error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::enforcer::{EdgeClassifier, ImportEdge, Verdict, VariantPolicy, ViolationReport};
use crate::resolver::{ModuleIdentity, ModulePathResolver, SOURCE_EXTENSIONS, is_bare_specifier};
use crate::{Error, Result};

/// Shared interceptor handle passed to bundler backends.
pub type SharedInterceptor = Arc<dyn ImportInterceptor>;

/// What the bundler should do with one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Let the bundler resolve and inline the module.
    Inline,
    /// Emit a runtime import of `id` instead.
    External { id: String },
}

/// Callback invoked once per discovered import edge.
pub trait ImportInterceptor: fmt::Debug + Send + Sync {
    fn intercept(&self, specifier: &str, importer: &Path) -> Result<EdgeDecision>;
}

/// Package names a variant may import without bundling.
#[derive(Debug, Clone, Default)]
pub struct ExternalPackages {
    names: FxHashSet<String>,
}

impl ExternalPackages {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether a bare specifier belongs to a recognised package. Deep imports
    /// (`@firebase/util/dist/x`) and `node:` prefixed built-ins are matched by
    /// their package name.
    pub fn recognises(&self, specifier: &str) -> bool {
        let name = package_name(specifier);
        self.names.contains(name)
            || specifier
                .strip_prefix("node:")
                .is_some_and(|builtin| self.names.contains(package_name(builtin)))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Package name portion of a bare specifier.
pub fn package_name(specifier: &str) -> &str {
    let mut slashes = specifier.match_indices('/').map(|(i, _)| i);
    let cut = if specifier.starts_with('@') {
        slashes.nth(1)
    } else {
        slashes.next()
    };
    cut.map_or(specifier, |i| &specifier[..i])
}

/// Interceptor combining resolution, layer classification and external
/// recognition for one variant.
#[derive(Debug)]
pub struct BoundaryInterceptor {
    resolver: Arc<ModulePathResolver>,
    classifier: Arc<dyn EdgeClassifier>,
    policy: VariantPolicy,
    externals: Arc<ExternalPackages>,
    external_alias: Option<String>,
}

impl BoundaryInterceptor {
    pub fn new(
        resolver: Arc<ModulePathResolver>,
        classifier: Arc<dyn EdgeClassifier>,
        policy: VariantPolicy,
        externals: Arc<ExternalPackages>,
    ) -> Self {
        Self {
            resolver,
            classifier,
            policy,
            externals,
            external_alias: None,
        }
    }

    /// Rewrite externalised project modules to a fixed import id.
    pub fn with_external_alias(mut self, alias: Option<String>) -> Self {
        self.external_alias = alias;
        self
    }

    pub fn policy(&self) -> &VariantPolicy {
        &self.policy
    }

    fn ambiguity(&self, specifier: &str, importer: &Path, reason: impl Into<String>) -> Error {
        Error::ResolutionAmbiguity {
            variant: self.policy.variant.clone(),
            specifier: specifier.to_string(),
            importer: self.resolver.display_path(importer),
            reason: reason.into(),
        }
    }
}

impl ImportInterceptor for BoundaryInterceptor {
    fn intercept(&self, specifier: &str, importer: &Path) -> Result<EdgeDecision> {
        let resolved = self
            .resolver
            .resolve(specifier, importer)
            .map_err(|e| self.ambiguity(specifier, importer, e.to_string()))?;

        let (target, file) = match resolved {
            ModuleIdentity::External if is_bare_specifier(specifier) => {
                if !self.externals.recognises(specifier) {
                    return Err(self.ambiguity(
                        specifier,
                        importer,
                        format!(
                            "package '{}' is not declared in package.json and is not an additional external",
                            package_name(specifier)
                        ),
                    ));
                }
                (ModuleIdentity::External, None)
            }
            ModuleIdentity::External => (ModuleIdentity::External, None),
            ModuleIdentity::Project(id) => {
                let found = if Path::new(&id) == self.resolver.root() {
                    locate_index(Path::new(&id))
                } else {
                    locate(&id)
                };
                let file = found.ok_or_else(|| {
                    self.ambiguity(
                        specifier,
                        importer,
                        "no source file matches under any known extension",
                    )
                })?;
                (self.resolver.identify(&file), Some(file))
            }
        };

        let edge = ImportEdge {
            importer: importer.to_path_buf(),
            specifier: specifier.to_string(),
            target,
        };
        let verdict = self.classifier.classify(&edge, &self.policy);

        tracing::debug!(
            variant = %self.policy.variant,
            importer = %self.resolver.display_path(importer),
            specifier,
            ?verdict,
            "classified import"
        );

        match verdict {
            Verdict::Inline => Ok(EdgeDecision::Inline),
            Verdict::External => {
                let id = match (&edge.target, &self.external_alias) {
                    (ModuleIdentity::Project(_), Some(alias)) => alias.clone(),
                    _ => specifier.to_string(),
                };
                Ok(EdgeDecision::External { id })
            }
            Verdict::Violation => {
                let module = file
                    .as_deref()
                    .map(|f| self.resolver.display_path(f))
                    .unwrap_or_else(|| edge.target.to_string());
                let report = ViolationReport {
                    variant: self.policy.variant.clone(),
                    layer: self.policy.layer_name().to_string(),
                    module,
                    importer: self.resolver.display_path(importer),
                    specifier: specifier.to_string(),
                };
                tracing::error!(%report, "layer violation");
                Err(Error::LayerViolation(report))
            }
        }
    }
}

/// Find the file backing an extension-free identity: the path itself, the
/// path with a known extension, or a directory index.
fn locate(identity: &str) -> Option<PathBuf> {
    let exact = PathBuf::from(identity);
    if exact.is_file() {
        return Some(exact);
    }

    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| PathBuf::from(format!("{identity}{ext}")))
        .find(|candidate| candidate.is_file())
        .or_else(|| locate_index(&exact))
}

/// Find `dir/index.<ext>` for a directory import.
fn locate_index(dir: &Path) -> Option<PathBuf> {
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("index{ext}")))
        .find(|candidate| candidate.is_file())
}
