//! `strata build`.

use std::sync::Arc;
use std::time::Instant;

use strata_bundler::{ExecuteOptions, RolldownBundler};
use strata_config::{PackageMetadata, validate_fs};

use crate::cli::BuildArgs;
use crate::config::{SettingsOverrides, build_plan, load_config, resolve_settings};
use crate::error::{CliError, Result};
use crate::{logger, ui};

/// Execute the build command.
///
/// # Build Process
///
/// 1. Load the config and layer settings (flags > env > file)
/// 2. Narrow to the selected variants, validate schema and filesystem
/// 3. Convert to a plan and build every variant concurrently
/// 4. Print the per-variant summary
///
/// # Errors
///
/// Configuration problems abort before any variant is built. If any variant
/// fails, the others are still built and written, and
/// [`CliError::BuildFailed`] is returned so the process exits non-zero.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let started = Instant::now();

    let config = load_config(args.config.as_deref())?;
    let overrides = SettingsOverrides {
        parallel_jobs: args.jobs.map(usize::from),
        log_level: None,
    };
    let settings = resolve_settings(&config.settings, &overrides)?;
    if let Some(level) = settings.log_level {
        logger::apply_config_level(level);
    }

    let config = config.select_variants(&args.variant)?;
    validate_fs(&config)?;

    let package = PackageMetadata::from_path_or_default(&config.package_path())?;
    let plan = build_plan(&config, &package)?;
    let total = plan.variants().len();

    ui::info(&format!("Building {total} variant(s)..."));
    if args.dry_run {
        ui::info("Dry run: nothing will be written");
    }

    let options = ExecuteOptions {
        parallel_jobs: settings.parallel_jobs,
        write: !args.dry_run,
    };
    let report = strata_bundler::execute(
        Arc::new(plan),
        Arc::new(RolldownBundler::new()),
        options,
    )
    .await?;

    ui::print_build_summary(&report);

    let failed = report.failure_count();
    if failed > 0 {
        return Err(CliError::BuildFailed { failed, total });
    }

    ui::success(&format!(
        "Built {total} variant(s) in {}",
        ui::format_duration(started.elapsed())
    ));
    Ok(())
}
