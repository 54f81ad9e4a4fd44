//! Explicitly enumerated architectural layers.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::resolver::{ModuleIdentity, ModulePathResolver};
use crate::{Error, Result};

/// An immutable set of module identities forming one layer.
///
/// Membership is declared by hand, never inferred from the import graph.
/// Shared read-only between concurrently building variants.
#[derive(Debug, Clone)]
pub struct LayerSet {
    name: String,
    members: FxHashSet<String>,
}

impl LayerSet {
    /// Build a layer from root-relative module paths (with or without
    /// extension).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the enumeration is empty or a path
    /// escapes the project root.
    pub fn new<I, S>(name: impl Into<String>, resolver: &ModulePathResolver, modules: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let mut members = FxHashSet::default();

        for module in modules {
            let module = module.as_ref().trim();
            if module.is_empty() {
                return Err(Error::Configuration(format!(
                    "layer '{name}' contains an empty module path"
                )));
            }
            match resolver.identify_relative(module) {
                ModuleIdentity::Project(id) if Path::new(&id) == resolver.root() => {
                    return Err(Error::Configuration(format!(
                        "layer '{name}' lists '{module}', which is the source root itself; name its index module instead"
                    )));
                }
                ModuleIdentity::Project(id) => {
                    members.insert(id);
                }
                ModuleIdentity::External => {
                    return Err(Error::Configuration(format!(
                        "layer '{name}' lists '{module}', which is outside the source root {}",
                        resolver.root().display()
                    )));
                }
            }
        }

        if members.is_empty() {
            return Err(Error::Configuration(format!(
                "layer '{name}' enumerates no modules"
            )));
        }

        tracing::debug!(layer = %name, modules = members.len(), "layer declared");
        Ok(Self { name, members })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// O(1) membership check. External identities are never members.
    pub fn is_member(&self, identity: &ModuleIdentity) -> bool {
        identity
            .as_path()
            .is_some_and(|path| self.members.contains(path))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn resolver() -> ModulePathResolver {
        ModulePathResolver::new("/project/src")
    }

    #[test]
    fn membership_ignores_extension_spelling() {
        let r = resolver();
        let layer = LayerSet::new(
            "persistence",
            &r,
            ["local/simple_db", "local/indexeddb_persistence.ts", "./api/persistence"],
        )
        .unwrap();

        let importer = Path::new("/project/src/index.ts");
        assert!(layer.is_member(&r.resolve("./local/simple_db.ts", importer).unwrap()));
        assert!(layer.is_member(&r.resolve("./local/indexeddb_persistence", importer).unwrap()));
        assert!(layer.is_member(&r.resolve("./api/persistence.ts", importer).unwrap()));
        assert!(!layer.is_member(&r.resolve("./api/database", importer).unwrap()));
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn external_is_never_a_member() {
        let layer = LayerSet::new("persistence", &resolver(), ["local/simple_db"]).unwrap();
        assert!(!layer.is_member(&ModuleIdentity::External));
    }

    #[test]
    fn empty_enumeration_is_a_configuration_error() {
        let err = LayerSet::new("persistence", &resolver(), Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("no modules")));
    }

    #[test]
    fn paths_escaping_the_root_are_rejected() {
        let err = LayerSet::new("persistence", &resolver(), ["../outside"]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn the_root_itself_is_not_a_layer_module() {
        for module in [".", "./", "local/.."] {
            let err = LayerSet::new("persistence", &resolver(), [module]).unwrap_err();
            assert!(matches!(err, Error::Configuration(msg) if msg.contains("source root")));
        }
    }
}
