//! Canonical module identities.
//!
//! The resolver maps an import specifier plus the path of the importing file to
//! a [`ModuleIdentity`]: an absolute, lexically normalised path with any known
//! source extension removed. It never touches the filesystem, so two spellings
//! of the same module (`./foo`, `./foo.ts`, `../dir/foo`, `/abs/dir/foo.ts`)
//! always produce byte-identical identities.

use std::fmt;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Source extensions stripped from identities, longest suffix first.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    ".d.ts", ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs", ".json",
];

/// Canonical identity of one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleIdentity {
    /// A module under the project root, as an absolute extension-free path.
    Project(String),
    /// A package import or a path outside the project root. Never subject to
    /// layer checks.
    External,
}

impl ModuleIdentity {
    pub fn is_external(&self) -> bool {
        matches!(self, ModuleIdentity::External)
    }

    /// The canonical path, if this is a project module.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            ModuleIdentity::Project(path) => Some(path),
            ModuleIdentity::External => None,
        }
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleIdentity::Project(path) => f.write_str(path),
            ModuleIdentity::External => f.write_str("<external>"),
        }
    }
}

/// Malformed resolver input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("import specifier is empty")]
    EmptySpecifier,

    #[error("import specifier contains a NUL byte")]
    NulByte,

    #[error("importing module path '{0}' is not absolute")]
    RelativeImporter(String),
}

/// Returns true for package imports such as `tslib`, `@firebase/util` or
/// `node:path`.
pub fn is_bare_specifier(specifier: &str) -> bool {
    !(specifier.starts_with('.') || specifier.starts_with('/'))
}

/// Pure, filesystem-free module path resolver bound to one project root.
#[derive(Debug, Clone)]
pub struct ModulePathResolver {
    root: PathBuf,
}

impl ModulePathResolver {
    /// Create a resolver for `root`. The root is lexically normalised; callers
    /// pass an absolute path.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().clean(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `specifier` as written inside the file at `importer`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] for malformed input only: an empty specifier,
    /// a NUL byte, or a relative importer path.
    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<ModuleIdentity, ResolveError> {
        if specifier.is_empty() {
            return Err(ResolveError::EmptySpecifier);
        }
        if specifier.contains('\0') {
            return Err(ResolveError::NulByte);
        }
        if !importer.is_absolute() {
            return Err(ResolveError::RelativeImporter(
                importer.to_string_lossy().into_owned(),
            ));
        }

        if is_bare_specifier(specifier) {
            return Ok(ModuleIdentity::External);
        }

        let target = Path::new(specifier);
        let joined = if target.is_absolute() {
            target.to_path_buf()
        } else {
            importer
                .parent()
                .unwrap_or_else(|| Path::new("/"))
                .join(target)
        };

        Ok(self.identify(&joined))
    }

    /// Identity of an absolute file or module path.
    ///
    /// The root itself is a project module (the directory whose index file is
    /// imported by `..` or `.`), so it keeps its name unstripped.
    pub fn identify(&self, path: &Path) -> ModuleIdentity {
        let cleaned = path.clean();
        if !cleaned.starts_with(&self.root) {
            return ModuleIdentity::External;
        }
        let text = cleaned.to_string_lossy();
        if cleaned == self.root {
            return ModuleIdentity::Project(text.into_owned());
        }
        ModuleIdentity::Project(strip_source_extension(&text).to_string())
    }

    /// Identity of a path given relative to the project root.
    pub fn identify_relative(&self, relative: &str) -> ModuleIdentity {
        self.identify(&self.root.join(relative))
    }

    /// Root-relative display form of a path, falling back to the full path.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

fn strip_source_extension(path: &str) -> &str {
    for ext in SOURCE_EXTENSIONS {
        if let Some(stem) = path.strip_suffix(ext) {
            if !stem.is_empty() && !stem.ends_with('/') {
                return stem;
            }
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resolver() -> ModulePathResolver {
        ModulePathResolver::new("/project/src")
    }

    fn importer() -> PathBuf {
        PathBuf::from("/project/src/api/database.ts")
    }

    #[test]
    fn bare_specifiers_are_external() {
        let r = resolver();
        for spec in ["tslib", "@firebase/util", "node:path", "util/types"] {
            assert_eq!(r.resolve(spec, &importer()).unwrap(), ModuleIdentity::External);
        }
    }

    #[test]
    fn relative_specifier_is_joined_and_stripped() {
        let id = resolver()
            .resolve("../local/simple_db.ts", &importer())
            .unwrap();
        assert_eq!(id, ModuleIdentity::Project("/project/src/local/simple_db".into()));
    }

    #[test]
    fn declaration_suffix_is_stripped_as_a_whole() {
        let id = resolver().resolve("./types.d.ts", &importer()).unwrap();
        assert_eq!(id, ModuleIdentity::Project("/project/src/api/types".into()));
    }

    #[test]
    fn only_one_extension_is_stripped() {
        let id = resolver().resolve("./bundle.esm.js", &importer()).unwrap();
        assert_eq!(id, ModuleIdentity::Project("/project/src/api/bundle.esm".into()));
    }

    #[test]
    fn paths_outside_root_are_external() {
        let r = resolver();
        assert!(r.resolve("../../../outside", &importer()).unwrap().is_external());
        assert!(r.resolve("/elsewhere/mod.ts", &importer()).unwrap().is_external());
    }

    #[test]
    fn malformed_input_is_rejected() {
        let r = resolver();
        assert_eq!(r.resolve("", &importer()), Err(ResolveError::EmptySpecifier));
        assert_eq!(r.resolve("./a\0b", &importer()), Err(ResolveError::NulByte));
        assert!(matches!(
            r.resolve("./a", Path::new("src/api/database.ts")),
            Err(ResolveError::RelativeImporter(_))
        ));
    }

    #[test]
    fn parent_of_a_top_level_directory_is_the_root_module() {
        let r = resolver();
        let root = ModuleIdentity::Project("/project/src".into());
        assert_eq!(r.resolve("..", &importer()).unwrap(), root);
        assert_eq!(r.resolve("../", &importer()).unwrap(), root);
        assert_eq!(
            r.resolve(".", Path::new("/project/src/index.ts")).unwrap(),
            root
        );
        assert!(r.resolve("../..", &importer()).unwrap().is_external());
    }

    #[test]
    fn identify_relative_matches_resolve() {
        let r = resolver();
        assert_eq!(
            r.identify_relative("local/simple_db"),
            r.resolve("../local/simple_db", &importer()).unwrap()
        );
    }

    #[test]
    fn display_path_is_root_relative() {
        let r = resolver();
        assert_eq!(
            r.display_path(Path::new("/project/src/persistence/indexeddb_cache.ts")),
            "persistence/indexeddb_cache.ts"
        );
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}"
    }

    proptest! {
        #[test]
        fn spellings_of_one_module_share_an_identity(
            dirs in proptest::collection::vec(segment(), 0..4),
            name in segment(),
            ext in proptest::sample::select(SOURCE_EXTENSIONS.to_vec()),
            detour in segment(),
        ) {
            let r = resolver();
            let importer = PathBuf::from("/project/src/index.ts");
            let rel = if dirs.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", dirs.join("/"), name)
            };

            let plain = r.resolve(&format!("./{rel}"), &importer).unwrap();
            let with_ext = r.resolve(&format!("./{rel}{ext}"), &importer).unwrap();
            let with_detour = r.resolve(&format!("./{detour}/../{rel}"), &importer).unwrap();
            let absolute = r.resolve(&format!("/project/src/{rel}{ext}"), &importer).unwrap();

            let nested_importer = PathBuf::from("/project/src/nested/deeper/mod.ts");
            let from_nested = r.resolve(&format!("../../{rel}"), &nested_importer).unwrap();

            prop_assert_eq!(&plain, &with_ext);
            prop_assert_eq!(&plain, &with_detour);
            prop_assert_eq!(&plain, &absolute);
            prop_assert_eq!(&plain, &from_nested);
            prop_assert!(!plain.is_external());
        }
    }
}
