//! Declarative variant build plan.
//!
//! A [`BuildPlan`] is a fixed table: the layers declared for the project, the
//! recognised external packages, and one [`VariantPlan`] row per variant. It
//! is validated once, before any traversal, and then shared read-only by all
//! concurrent variant builds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use path_clean::PathClean;
use rustc_hash::FxHashMap;

use crate::bundler::{BundleRequest, OutputFormat, OutputSpec};
use crate::enforcer::{EnforcementMode, VariantPolicy};
use crate::interceptor::ExternalPackages;
use crate::layer::LayerSet;
use crate::resolver::ModulePathResolver;
use crate::transform::TransformSettings;
use crate::{Error, Result};

/// One row of the plan table.
#[derive(Debug, Clone)]
pub struct VariantPlan {
    pub name: String,
    /// Entry file, relative to the source root.
    pub entry: PathBuf,
    pub mode: EnforcementMode,
    /// Name of the layer the policy is checked against.
    pub layer: Option<String>,
    /// Import id used for project modules an `allow-only-layer` variant
    /// leaves external.
    pub external_alias: Option<String>,
    pub transform: TransformSettings,
    pub outputs: Vec<OutputSpec>,
}

impl VariantPlan {
    pub fn new(name: impl Into<String>, entry: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            mode: EnforcementMode::Unrestricted,
            layer: None,
            external_alias: None,
            transform: TransformSettings::default(),
            outputs: Vec::new(),
        }
    }

    pub fn mode(mut self, mode: EnforcementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn external_alias(mut self, alias: impl Into<String>) -> Self {
        self.external_alias = Some(alias.into());
        self
    }

    pub fn transform(mut self, transform: TransformSettings) -> Self {
        self.transform = transform;
        self
    }

    pub fn output(mut self, output: OutputSpec) -> Self {
        self.outputs.push(output);
        self
    }
}

/// The complete, immutable plan for one build invocation.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    resolver: Arc<ModulePathResolver>,
    out_dir: PathBuf,
    layers: FxHashMap<String, Arc<LayerSet>>,
    externals: Arc<ExternalPackages>,
    variants: Vec<VariantPlan>,
}

impl BuildPlan {
    /// Create an empty plan.
    ///
    /// `root` is the source root that entries and layer paths are relative
    /// to; it is canonicalised when it exists so that paths reported by the
    /// bundler (which follows symlinks) compare equal. `out_dir` is the base
    /// directory output files are written under.
    pub fn new(root: impl AsRef<Path>, out_dir: impl Into<PathBuf>) -> Self {
        let root = absolute(root.as_ref());
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        Self {
            resolver: Arc::new(ModulePathResolver::new(root)),
            out_dir: out_dir.into(),
            layers: FxHashMap::default(),
            externals: Arc::new(ExternalPackages::default()),
            variants: Vec::new(),
        }
    }

    /// Declare a layer from an explicit module enumeration.
    pub fn layer<I, S>(mut self, name: impl Into<String>, modules: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let layer = LayerSet::new(name.clone(), &self.resolver, modules)?;
        self.layers.insert(name, Arc::new(layer));
        Ok(self)
    }

    /// Add recognised external package names.
    pub fn externals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let externals = Arc::make_mut(&mut self.externals);
        for name in names {
            externals.insert(name);
        }
        self
    }

    pub fn variant(mut self, variant: VariantPlan) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn resolver(&self) -> Arc<ModulePathResolver> {
        Arc::clone(&self.resolver)
    }

    pub fn externals_set(&self) -> Arc<ExternalPackages> {
        Arc::clone(&self.externals)
    }

    pub fn variants(&self) -> &[VariantPlan] {
        &self.variants
    }

    pub fn layer_set(&self, name: &str) -> Option<Arc<LayerSet>> {
        self.layers.get(name).cloned()
    }

    /// Absolute entry file of a variant.
    pub fn entry_path(&self, variant: &VariantPlan) -> PathBuf {
        self.root().join(&variant.entry).clean()
    }

    /// Check every row before any bundling starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a missing entry point, an
    /// undefined layer, a missing output format, a duplicated variant name,
    /// a misplaced or missing external alias, an unsupported `es5` target, or
    /// a `forbid-layer` entry that is itself a layer member.
    pub fn validate(&self) -> Result<()> {
        if self.variants.is_empty() {
            return Err(Error::Configuration("the plan declares no variants".into()));
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            if !seen.insert(variant.name.as_str()) {
                return Err(Error::Configuration(format!(
                    "variant '{}' is declared more than once",
                    variant.name
                )));
            }
            self.validate_variant(variant)?;
        }
        Ok(())
    }

    fn validate_variant(&self, variant: &VariantPlan) -> Result<()> {
        let name = &variant.name;

        let entry = self.entry_path(variant);
        if !entry.is_file() {
            return Err(Error::Configuration(format!(
                "variant '{name}': entry point not found: {}",
                entry.display()
            )));
        }

        let policy = self.policy(variant)?;

        if variant.mode == EnforcementMode::ForbidLayer {
            if let Some(layer) = &policy.layer {
                if layer.is_member(&policy.entry) {
                    return Err(Error::Configuration(format!(
                        "variant '{name}': entry {} belongs to forbidden layer '{}'",
                        variant.entry.display(),
                        layer.name()
                    )));
                }
            }
        }

        if variant.external_alias.is_some() && variant.mode != EnforcementMode::AllowOnlyLayer {
            return Err(Error::Configuration(format!(
                "variant '{name}': external_alias requires mode 'allow-only-layer', not '{}'",
                variant.mode
            )));
        }

        // Project modules outside the layer are imported through the alias.
        if variant.mode == EnforcementMode::AllowOnlyLayer && variant.external_alias.is_none() {
            return Err(Error::Configuration(format!(
                "variant '{name}': mode 'allow-only-layer' requires external_alias"
            )));
        }

        variant.transform.target.to_rolldown_target().map_err(|e| match e {
            Error::Configuration(msg) => Error::Configuration(format!("variant '{name}': {msg}")),
            other => other,
        })?;

        for format in [OutputFormat::Cjs, OutputFormat::Esm] {
            if !variant.outputs.iter().any(|o| o.format == format) {
                return Err(Error::Configuration(format!(
                    "variant '{name}' has no '{format}' output"
                )));
            }
        }

        Ok(())
    }

    /// Policy record for one variant.
    pub fn policy(&self, variant: &VariantPlan) -> Result<VariantPolicy> {
        let layer = match (&variant.layer, variant.mode) {
            (Some(name), _) => Some(self.layer_set(name).ok_or_else(|| {
                Error::Configuration(format!(
                    "variant '{}' references undefined layer '{}'",
                    variant.name, name
                ))
            })?),
            (None, EnforcementMode::Unrestricted) => None,
            (None, mode) => {
                return Err(Error::Configuration(format!(
                    "variant '{}' uses mode '{}' but names no layer",
                    variant.name, mode
                )));
            }
        };

        Ok(VariantPolicy {
            variant: variant.name.clone(),
            entry: self.resolver.identify(&self.entry_path(variant)),
            mode: variant.mode,
            layer,
        })
    }

    /// Bundler request for one variant.
    pub fn request(&self, variant: &VariantPlan) -> BundleRequest {
        BundleRequest {
            variant: variant.name.clone(),
            entry: self.entry_path(variant),
            root: self.root().to_path_buf(),
            outputs: variant.outputs.clone(),
            transform: variant.transform.clone(),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.clean();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path).clean())
        .unwrap_or_else(|_| path.clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::EsTarget;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in ["index.ts", "local/simple_db.ts", "api/persistence.ts"] {
            let path = dir.path().join("src").join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "export {};\n").unwrap();
        }
        dir
    }

    fn both_formats(variant: VariantPlan) -> VariantPlan {
        variant
            .output(OutputSpec::new(OutputFormat::Cjs, "dist/a.cjs.js"))
            .output(OutputSpec::new(OutputFormat::Esm, "dist/a.esm.js"))
    }

    fn plan(dir: &TempDir) -> BuildPlan {
        BuildPlan::new(dir.path().join("src"), dir.path())
            .layer("persistence", ["local/simple_db", "api/persistence"])
            .unwrap()
    }

    #[test]
    fn valid_plan_passes() {
        let dir = project();
        let plan = plan(&dir).variant(both_formats(
            VariantPlan::new("lite", "index.ts")
                .mode(EnforcementMode::ForbidLayer)
                .layer("persistence"),
        ));
        plan.validate().unwrap();
    }

    #[test]
    fn missing_entry_is_a_configuration_error() {
        let dir = project();
        let plan = plan(&dir).variant(both_formats(VariantPlan::new("lite", "missing.ts")));
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("entry point not found")));
    }

    #[test]
    fn undefined_layer_is_a_configuration_error() {
        let dir = project();
        let plan = plan(&dir).variant(both_formats(
            VariantPlan::new("lite", "index.ts")
                .mode(EnforcementMode::ForbidLayer)
                .layer("storage"),
        ));
        assert!(matches!(plan.validate(), Err(Error::Configuration(msg)) if msg.contains("storage")));
    }

    #[test]
    fn enforcing_mode_without_layer_is_rejected() {
        let dir = project();
        let plan = plan(&dir).variant(both_formats(
            VariantPlan::new("lite", "index.ts").mode(EnforcementMode::AllowOnlyLayer),
        ));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn missing_format_is_rejected() {
        let dir = project();
        let plan = plan(&dir).variant(
            VariantPlan::new("lite", "index.ts")
                .output(OutputSpec::new(OutputFormat::Cjs, "dist/a.cjs.js")),
        );
        assert!(matches!(plan.validate(), Err(Error::Configuration(msg)) if msg.contains("esm")));
    }

    #[test]
    fn duplicate_variant_is_rejected() {
        let dir = project();
        let plan = plan(&dir)
            .variant(both_formats(VariantPlan::new("lite", "index.ts")))
            .variant(both_formats(VariantPlan::new("lite", "index.ts")));
        assert!(matches!(plan.validate(), Err(Error::Configuration(msg)) if msg.contains("more than once")));
    }

    #[test]
    fn forbid_layer_entry_inside_layer_is_rejected() {
        let dir = project();
        let plan = plan(&dir).variant(both_formats(
            VariantPlan::new("broken", "api/persistence.ts")
                .mode(EnforcementMode::ForbidLayer)
                .layer("persistence"),
        ));
        assert!(matches!(plan.validate(), Err(Error::Configuration(msg)) if msg.contains("forbidden layer")));
    }

    #[test]
    fn alias_requires_allow_only_layer() {
        let dir = project();
        let plan = plan(&dir).variant(both_formats(
            VariantPlan::new("lite", "index.ts").external_alias("pkg/thick"),
        ));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn allow_only_layer_requires_an_alias() {
        let dir = project();
        let variant = VariantPlan::new("persistence", "index.ts")
            .mode(EnforcementMode::AllowOnlyLayer)
            .layer("persistence");

        let missing = plan(&dir).variant(both_formats(variant.clone()));
        assert!(matches!(
            missing.validate(),
            Err(Error::Configuration(msg)) if msg.contains("requires external_alias")
        ));

        let aliased = plan(&dir).variant(both_formats(variant.external_alias("pkg/thick")));
        aliased.validate().unwrap();
    }

    #[test]
    fn es5_target_is_rejected_before_bundling() {
        let dir = project();
        let plan = plan(&dir).variant(both_formats(VariantPlan::new("legacy", "index.ts").transform(
            TransformSettings {
                target: EsTarget::Es5,
                ..Default::default()
            },
        )));
        assert!(matches!(
            plan.validate(),
            Err(Error::Configuration(msg)) if msg.contains("'legacy'") && msg.contains("es2015")
        ));
    }

    #[test]
    fn request_carries_absolute_entry() {
        let dir = project();
        let plan = plan(&dir);
        let variant = both_formats(VariantPlan::new("lite", "index.ts"));
        let request = plan.request(&variant);
        assert!(request.entry.is_absolute());
        assert!(request.entry.ends_with("src/index.ts"));
        assert_eq!(request.outputs.len(), 2);
    }
}
