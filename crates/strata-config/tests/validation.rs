//! Tests for filesystem-backed configuration validation.

use std::fs;

use serde_json::json;
use strata_config::{ConfigError, ConfigValidator, FsValidator, StrataConfig};
use tempfile::TempDir;

fn config_in(dir: &TempDir, entry: &str) -> StrataConfig {
    StrataConfig::from_value(json!({
        "layers": { "persistence": { "modules": ["api/persistence"] } },
        "variants": [{
            "name": "lite",
            "entry": entry,
            "mode": "forbid-layer",
            "layer": "persistence",
            "outputs": [
                { "format": "cjs", "file": "dist/index.cjs.js" },
                { "format": "esm", "file": "dist/index.esm.js" }
            ]
        }]
    }))
    .expect("valid config")
    .with_base_dir(dir.path())
}

#[test]
fn validate_catches_missing_root() {
    let dir = TempDir::new().expect("tempdir");
    let result = FsValidator.validate(&config_in(&dir, "index.ts"));
    match result.unwrap_err() {
        ConfigError::RootNotFound(path) => assert!(path.ends_with("src")),
        other => panic!("expected RootNotFound, got {other:?}"),
    }
}

#[test]
fn validate_catches_missing_entry() {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir(dir.path().join("src")).expect("create src dir");

    let result = FsValidator.validate(&config_in(&dir, "index.ts"));
    match result.unwrap_err() {
        ConfigError::EntryNotFound { variant, path } => {
            assert_eq!(variant, "lite");
            assert!(path.ends_with("src/index.ts"));
        }
        other => panic!("expected EntryNotFound, got {other:?}"),
    }
}

#[test]
fn validate_succeeds_when_entry_exists() {
    let dir = TempDir::new().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir(&src).expect("create src dir");
    fs::write(src.join("index.ts"), "export {};").expect("write entry");

    assert!(FsValidator.validate(&config_in(&dir, "index.ts")).is_ok());
}

#[test]
fn validate_runs_schema_checks_first() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = config_in(&dir, "index.ts");
    config.layers.get_mut("persistence").unwrap().modules.clear();

    assert!(matches!(
        FsValidator.validate(&config).unwrap_err(),
        ConfigError::EmptyLayer(_)
    ));
}
