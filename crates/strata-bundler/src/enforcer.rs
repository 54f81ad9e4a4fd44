//! Pure import-edge classification (no IO).
//!
//! Input: one resolved [`ImportEdge`] and the [`VariantPolicy`] of the variant
//! being built. Output: a [`Verdict`]. Classification is stateless, so the same
//! edge and policy always yield the same verdict, and it is safe to call from
//! any number of concurrent resolver tasks.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::layer::LayerSet;
use crate::resolver::ModuleIdentity;

/// How a variant treats its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnforcementMode {
    /// Layer members must never be reached.
    ForbidLayer,
    /// Only layer members are bundled; everything else stays external.
    AllowOnlyLayer,
    /// Everything resolvable is bundled.
    #[default]
    Unrestricted,
}

impl EnforcementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementMode::ForbidLayer => "forbid-layer",
            EnforcementMode::AllowOnlyLayer => "allow-only-layer",
            EnforcementMode::Unrestricted => "unrestricted",
        }
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered reference from one module to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    /// Absolute path of the referencing module.
    pub importer: PathBuf,
    /// Specifier exactly as written in the source.
    pub specifier: String,
    /// Resolved identity of the referenced module.
    pub target: ModuleIdentity,
}

/// Read-only per-variant policy.
#[derive(Debug, Clone)]
pub struct VariantPolicy {
    pub variant: String,
    pub entry: ModuleIdentity,
    pub mode: EnforcementMode,
    pub layer: Option<Arc<LayerSet>>,
}

impl VariantPolicy {
    fn is_member(&self, identity: &ModuleIdentity) -> bool {
        self.layer
            .as_ref()
            .is_some_and(|layer| layer.is_member(identity))
    }

    pub fn layer_name(&self) -> &str {
        self.layer.as_ref().map(|l| l.name()).unwrap_or("<none>")
    }
}

/// Outcome of classifying one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Compile the referenced module into the artifact.
    Inline,
    /// Leave the reference as a runtime import.
    External,
    /// The edge breaks the variant's layering contract.
    Violation,
}

/// Narrow classification seam between the bundler and layering rules.
pub trait EdgeClassifier: fmt::Debug + Send + Sync {
    fn classify(&self, edge: &ImportEdge, policy: &VariantPolicy) -> Verdict;
}

/// Default classifier implementing the three enforcement modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryEnforcer;

impl EdgeClassifier for BoundaryEnforcer {
    fn classify(&self, edge: &ImportEdge, policy: &VariantPolicy) -> Verdict {
        if edge.target.is_external() {
            return Verdict::External;
        }

        let member = policy.is_member(&edge.target);
        match policy.mode {
            EnforcementMode::ForbidLayer if member => Verdict::Violation,
            EnforcementMode::ForbidLayer => Verdict::Inline,
            EnforcementMode::AllowOnlyLayer if member => Verdict::Inline,
            EnforcementMode::AllowOnlyLayer => Verdict::External,
            EnforcementMode::Unrestricted => Verdict::Inline,
        }
    }
}

/// A forbidden edge, with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViolationReport {
    pub variant: String,
    pub layer: String,
    /// Root-relative path of the forbidden module, e.g.
    /// `persistence/indexeddb_cache.ts`.
    pub module: String,
    /// Root-relative path of the importing file.
    pub importer: String,
    pub specifier: String,
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variant '{}' imports {} (layer '{}') via '{}' in {}",
            self.variant, self.module, self.layer, self.specifier, self.importer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ModulePathResolver;

    fn resolver() -> ModulePathResolver {
        ModulePathResolver::new("/project/src")
    }

    fn policy(mode: EnforcementMode) -> VariantPolicy {
        let r = resolver();
        VariantPolicy {
            variant: "test".into(),
            entry: r.identify_relative("index.ts"),
            mode,
            layer: Some(Arc::new(LayerSet::new("layer", &r, ["a", "b"]).unwrap())),
        }
    }

    fn edge(target: &str) -> ImportEdge {
        let r = resolver();
        ImportEdge {
            importer: PathBuf::from("/project/src/index.ts"),
            specifier: format!("./{target}"),
            target: r.identify_relative(target),
        }
    }

    fn external_edge() -> ImportEdge {
        ImportEdge {
            importer: PathBuf::from("/project/src/index.ts"),
            specifier: "tslib".into(),
            target: ModuleIdentity::External,
        }
    }

    #[test]
    fn external_is_external_under_every_mode() {
        for mode in [
            EnforcementMode::ForbidLayer,
            EnforcementMode::AllowOnlyLayer,
            EnforcementMode::Unrestricted,
        ] {
            assert_eq!(
                BoundaryEnforcer.classify(&external_edge(), &policy(mode)),
                Verdict::External,
                "mode {mode}"
            );
        }
    }

    #[test]
    fn forbid_layer_rejects_members_and_inlines_the_rest() {
        let p = policy(EnforcementMode::ForbidLayer);
        assert_eq!(BoundaryEnforcer.classify(&edge("a"), &p), Verdict::Violation);
        assert_eq!(BoundaryEnforcer.classify(&edge("c"), &p), Verdict::Inline);
    }

    #[test]
    fn allow_only_layer_inlines_members_and_externalises_the_rest() {
        let p = policy(EnforcementMode::AllowOnlyLayer);
        assert_eq!(BoundaryEnforcer.classify(&edge("b"), &p), Verdict::Inline);
        assert_eq!(BoundaryEnforcer.classify(&edge("c"), &p), Verdict::External);
    }

    #[test]
    fn unrestricted_inlines_everything_in_project() {
        let p = policy(EnforcementMode::Unrestricted);
        assert_eq!(BoundaryEnforcer.classify(&edge("a"), &p), Verdict::Inline);
        assert_eq!(BoundaryEnforcer.classify(&edge("c"), &p), Verdict::Inline);
    }

    #[test]
    fn classification_is_idempotent() {
        let p = policy(EnforcementMode::ForbidLayer);
        let e = edge("a");
        let first = BoundaryEnforcer.classify(&e, &p);
        let second = BoundaryEnforcer.classify(&e, &p);
        assert_eq!(first, second);
    }

    #[test]
    fn violation_report_names_module_and_variant() {
        let report = ViolationReport {
            variant: "thick-client".into(),
            layer: "persistence".into(),
            module: "persistence/indexeddb_cache.ts".into(),
            importer: "thick-client.ts".into(),
            specifier: "./persistence/indexeddb_cache".into(),
        };
        let text = report.to_string();
        assert!(text.contains("thick-client"));
        assert!(text.contains("persistence/indexeddb_cache.ts"));
    }
}
