//! `strata check`.
//!
//! Validates the config and the derived plan without bundling.

use strata_config::{PackageMetadata, validate_fs};

use crate::cli::CheckArgs;
use crate::config::{SettingsOverrides, build_plan, load_config, resolve_settings};
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Config schema (layers non-empty, both formats per variant, ...)
/// 2. Source root and entry files exist
/// 3. Layered settings extract cleanly
/// 4. The plan built from config and `package.json` validates
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let config = load_config(args.config.as_deref())?;
    validate_fs(&config)?;
    resolve_settings(&config.settings, &SettingsOverrides::default())?;

    let package = PackageMetadata::from_path_or_default(&config.package_path())?;
    let plan = build_plan(&config, &package)?;
    plan.validate()?;

    for variant in plan.variants() {
        let layer = variant
            .layer
            .as_deref()
            .map(|l| format!(" ({l})"))
            .unwrap_or_default();
        ui::success(&format!("  {}: {}{}", variant.name, variant.mode, layer));
    }

    ui::success("All checks passed!");
    Ok(())
}
