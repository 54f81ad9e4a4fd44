use std::path::PathBuf;

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_root() -> PathBuf {
    PathBuf::from("src")
}

pub(crate) fn default_package() -> PathBuf {
    PathBuf::from("package.json")
}

pub(crate) fn default_minify() -> String {
    "none".to_string()
}
