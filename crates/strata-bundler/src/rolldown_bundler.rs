//! Rolldown-backed [`Bundler`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rolldown::{
    BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, ResolveOptions,
    SourceMapType,
};
use rolldown_common::{BundlerTransformOptions, Either, Output};
use rolldown_plugin::__inner::SharedPluginable;

use crate::boundary_plugin::BoundaryPlugin;
use crate::bundler::{Artifact, BundleRequest, Bundler, OutputSpec};
use crate::interceptor::SharedInterceptor;
use crate::resolver::SOURCE_EXTENSIONS;
use crate::transform::TransformSettings;
use crate::{Error, Result, diagnostics};

/// Production bundler: one Rolldown build per requested output format.
#[derive(Debug, Clone, Default)]
pub struct RolldownBundler;

impl RolldownBundler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Bundler for RolldownBundler {
    fn name(&self) -> &str {
        "rolldown"
    }

    async fn bundle(
        &self,
        request: BundleRequest,
        interceptor: SharedInterceptor,
    ) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::with_capacity(request.outputs.len());
        for output in &request.outputs {
            let artifact = build_output(&request, output, Arc::clone(&interceptor)).await?;
            artifacts.push(artifact);
        }
        Ok(artifacts)
    }
}

async fn build_output(
    request: &BundleRequest,
    output: &OutputSpec,
    interceptor: SharedInterceptor,
) -> Result<Artifact> {
    let plugin = Arc::new(BoundaryPlugin::new(interceptor));
    let options = configure_rolldown_options(request, output)?;

    tracing::debug!(
        variant = %request.variant,
        format = %output.format,
        "starting rolldown build"
    );

    let mut bundler = RolldownBundlerBuilder::default()
        .with_options(options)
        .with_plugins(vec![Arc::clone(&plugin) as SharedPluginable])
        .build()
        .map_err(|e| Error::from_rolldown_batch(&e))?;

    let bundle = match bundler.generate().await {
        Ok(bundle) => bundle,
        Err(e) => {
            // Structured errors recorded by the boundary hook take priority
            // over Rolldown's rendering of them.
            let mut failures = plugin.take_failures();
            if failures.is_empty() {
                return Err(Error::from_rolldown_batch(&e));
            }
            for extra in failures.iter().skip(1) {
                tracing::error!(variant = %request.variant, "{extra}");
            }
            return Err(failures.remove(0));
        }
    };

    let chunk = bundle
        .assets
        .iter()
        .find_map(|item| match item {
            Output::Chunk(chunk) if chunk.is_entry => Some(chunk),
            _ => None,
        })
        .ok_or_else(|| {
            Error::Bundler(vec![diagnostics::internal(
                "MissingEntryChunk",
                format!(
                    "Rolldown produced no entry chunk for variant '{}' ({})",
                    request.variant, output.format
                ),
            )])
        })?;

    Ok(Artifact {
        format: output.format,
        file: output.file.clone(),
        code: chunk.code.clone(),
        map: if output.sourcemap {
            chunk.map.as_ref().map(|m| m.to_json_string())
        } else {
            None
        },
    })
}

/// Configure Rolldown options for one variant output.
fn configure_rolldown_options(
    request: &BundleRequest,
    output: &OutputSpec,
) -> Result<BundlerOptions> {
    let TransformSettings {
        target,
        platform,
        minify,
    } = &request.transform;

    let transform = target
        .to_rolldown_target()?
        .map(|target| BundlerTransformOptions {
            target: Some(Either::Left(target)),
            ..Default::default()
        });

    Ok(BundlerOptions {
        input: Some(vec![InputItem {
            name: Some(entry_name(&request.entry)),
            import: request.entry.to_string_lossy().into_owned(),
        }]),
        cwd: Some(request.root.clone()),
        format: Some(output.format.to_rolldown()),
        platform: Some(*platform),
        sourcemap: output.sourcemap.then_some(SourceMapType::File),
        minify: minify.to_rolldown_options(),
        transform,
        resolve: Some(ResolveOptions {
            extensions: Some(
                SOURCE_EXTENSIONS
                    .iter()
                    .filter(|ext| **ext != ".d.ts")
                    .map(|ext| ext.to_string())
                    .collect(),
            ),
            symlinks: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Extract a chunk name from an entry path.
fn entry_name(entry: &Path) -> String {
    entry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index")
        .to_string()
}
