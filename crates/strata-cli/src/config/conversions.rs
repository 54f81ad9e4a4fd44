//! Authored config -> executable plan.

use std::path::PathBuf;

use strata_bundler::{
    BuildPlan, EsTarget, MinifyLevel, OutputSpec, Platform, TransformSettings, VariantPlan,
};
use strata_config::{
    ConfigError, EnforcementMode, OutputTarget, PackageMetadata, StrataConfig, TransformConfig,
    VariantConfig,
};

use crate::error::Result;

/// Build the plan for every variant in `config`.
///
/// Recognised externals are the manifest's dependencies and peer dependencies
/// plus `project.additional_externals`. Outputs naming a `package_field` are
/// looked up in `package`.
pub fn build_plan(config: &StrataConfig, package: &PackageMetadata) -> Result<BuildPlan> {
    let mut plan = BuildPlan::new(config.root_dir(), config.base_dir.clone())
        .externals(package.external_packages())
        .externals(config.project.additional_externals.iter().cloned());

    for (name, layer) in &config.layers {
        plan = plan.layer(name.clone(), &layer.modules)?;
    }

    for variant in &config.variants {
        plan = plan.variant(variant_plan(config, variant, package)?);
    }

    Ok(plan)
}

fn variant_plan(
    config: &StrataConfig,
    variant: &VariantConfig,
    package: &PackageMetadata,
) -> Result<VariantPlan> {
    let mut plan = VariantPlan::new(variant.name.clone(), variant.entry.clone())
        .mode(mode(variant.mode))
        .transform(transform(&variant.transform)?);

    if let Some(layer) = &variant.layer {
        plan = plan.layer(layer.clone());
    }
    if let Some(alias) = &variant.external_alias {
        plan = plan.external_alias(alias.clone());
    }

    for output in &variant.outputs {
        let file = output_file(config, variant, output, package)?;
        plan = plan.output(OutputSpec::new(format(output.format), file).sourcemap(output.sourcemap));
    }

    Ok(plan)
}

fn output_file(
    config: &StrataConfig,
    variant: &VariantConfig,
    output: &OutputTarget,
    package: &PackageMetadata,
) -> Result<PathBuf> {
    if let Some(file) = &output.file {
        return Ok(file.clone());
    }

    let Some(field) = &output.package_field else {
        return Err(ConfigError::InvalidValue {
            field: "outputs".to_string(),
            hint: Some(format!(
                "variant '{}': '{}' output needs either 'file' or 'package_field'",
                variant.name, output.format
            )),
        }
        .into());
    };

    let value = package.field(field).ok_or_else(|| ConfigError::PackageField {
        variant: variant.name.clone(),
        field: field.clone(),
    })?;

    // Manifest paths are relative to the manifest; outputs are written under
    // the config directory.
    let anchored = match package.path.parent() {
        Some(dir) => dir.join(value),
        None => PathBuf::from(value),
    };
    Ok(anchored
        .strip_prefix(&config.base_dir)
        .map(PathBuf::from)
        .unwrap_or(anchored))
}

fn mode(mode: EnforcementMode) -> strata_bundler::EnforcementMode {
    match mode {
        EnforcementMode::ForbidLayer => strata_bundler::EnforcementMode::ForbidLayer,
        EnforcementMode::AllowOnlyLayer => strata_bundler::EnforcementMode::AllowOnlyLayer,
        EnforcementMode::Unrestricted => strata_bundler::EnforcementMode::Unrestricted,
    }
}

fn format(format: strata_config::OutputFormat) -> strata_bundler::OutputFormat {
    match format {
        strata_config::OutputFormat::Cjs => strata_bundler::OutputFormat::Cjs,
        strata_config::OutputFormat::Esm => strata_bundler::OutputFormat::Esm,
    }
}

fn transform(config: &TransformConfig) -> Result<TransformSettings> {
    Ok(TransformSettings {
        target: match config.target {
            strata_config::EsTarget::ES5 => EsTarget::Es5,
            strata_config::EsTarget::ES2015 => EsTarget::Es2015,
            strata_config::EsTarget::ES2017 => EsTarget::Es2017,
            strata_config::EsTarget::ES2020 => EsTarget::Es2020,
            strata_config::EsTarget::ES2022 => EsTarget::Es2022,
            strata_config::EsTarget::ESNext => EsTarget::EsNext,
        },
        platform: match config.platform {
            strata_config::Platform::Browser => Platform::Browser,
            strata_config::Platform::Node => Platform::Node,
        },
        minify: MinifyLevel::parse(&config.minify)?,
    })
}
