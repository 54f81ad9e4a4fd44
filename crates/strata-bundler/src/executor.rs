//! Concurrent execution of a [`BuildPlan`].
//!
//! Each variant is built in its own task, bounded by a semaphore. A failing
//! variant never aborts the others; its error is recorded in the
//! [`BuildReport`] and nothing is written for it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::bundler::Bundler;
use crate::enforcer::{BoundaryEnforcer, EdgeClassifier, EnforcementMode};
use crate::interceptor::{BoundaryInterceptor, SharedInterceptor};
use crate::output::{WrittenFile, write_artifacts};
use crate::plan::{BuildPlan, VariantPlan};
use crate::{Error, Result, diagnostics};

/// Execution knobs.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Maximum variants built at once; defaults to `min(num_cpus, 8)`.
    pub parallel_jobs: Option<usize>,
    /// Write artifacts to disk. Disabled for dry runs.
    pub write: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            parallel_jobs: None,
            write: true,
        }
    }
}

/// Result of building one variant.
#[derive(Debug)]
pub struct VariantOutcome {
    pub name: String,
    pub mode: EnforcementMode,
    pub target: String,
    pub duration: Duration,
    pub result: Result<Vec<WrittenFile>>,
}

impl VariantOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-variant results in plan order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub variants: Vec<VariantOutcome>,
}

impl BuildReport {
    /// True only if every variant completed.
    pub fn is_success(&self) -> bool {
        self.variants.iter().all(VariantOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.variants
            .iter()
            .filter_map(|v| v.result.as_ref().err().map(|e| (v.name.as_str(), e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Validate `plan`, then build every variant concurrently.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the plan is invalid; no variant is
/// built in that case. Variant failures are reported inside the
/// [`BuildReport`], not as an `Err`.
pub async fn execute(
    plan: Arc<BuildPlan>,
    bundler: Arc<dyn Bundler>,
    options: ExecuteOptions,
) -> Result<BuildReport> {
    plan.validate()?;

    let max_parallel = options
        .parallel_jobs
        .unwrap_or_else(|| num_cpus::get().min(8))
        .max(1);

    tracing::info!(
        variants = plan.variants().len(),
        max_parallel,
        bundler = bundler.name(),
        "building variants"
    );

    let classifier: Arc<dyn EdgeClassifier> = Arc::new(BoundaryEnforcer);
    let semaphore = Arc::new(Semaphore::new(max_parallel));
    let mut join_set = JoinSet::new();

    for (index, variant) in plan.variants().iter().enumerate() {
        let plan = Arc::clone(&plan);
        let bundler = Arc::clone(&bundler);
        let classifier = Arc::clone(&classifier);
        let permit = Arc::clone(&semaphore);
        let write = options.write;

        join_set.spawn(async move {
            let variant = &plan.variants()[index];
            let _permit = match permit.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    let err = Error::Bundler(vec![diagnostics::internal(
                        "SchedulerClosed",
                        "build scheduler closed before the variant started",
                    )]);
                    return (index, Duration::ZERO, Err(err));
                }
            };

            let started = Instant::now();
            let result = build_variant(&plan, variant, bundler, classifier, write).await;
            (index, started.elapsed(), result)
        });

        tracing::debug!(variant = %variant.name, "scheduled");
    }

    let mut results: FxHashMap<usize, (Duration, Result<Vec<WrittenFile>>)> = FxHashMap::default();
    let mut panics = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, duration, result)) => {
                results.insert(index, (duration, result));
            }
            Err(join_err) => panics.push(join_err.to_string()),
        }
    }

    // Report in plan order for determinism.
    let variants = plan
        .variants()
        .iter()
        .enumerate()
        .map(|(index, variant)| {
            let (duration, result) = results.remove(&index).unwrap_or_else(|| {
                let err = Error::Bundler(vec![diagnostics::internal(
                    "PanicDuringBuild",
                    format!("Build task panicked: {}", panics.join("; ")),
                )]);
                (Duration::ZERO, Err(err))
            });

            match &result {
                Ok(files) => tracing::info!(
                    variant = %variant.name,
                    files = files.len(),
                    elapsed_ms = duration.as_millis() as u64,
                    "variant built"
                ),
                Err(err) => tracing::error!(variant = %variant.name, "variant failed: {err}"),
            }

            VariantOutcome {
                name: variant.name.clone(),
                mode: variant.mode,
                target: variant.transform.target.to_string(),
                duration,
                result,
            }
        })
        .collect();

    Ok(BuildReport { variants })
}

async fn build_variant(
    plan: &BuildPlan,
    variant: &VariantPlan,
    bundler: Arc<dyn Bundler>,
    classifier: Arc<dyn EdgeClassifier>,
    write: bool,
) -> Result<Vec<WrittenFile>> {
    let policy = plan.policy(variant)?;
    tracing::info!(
        variant = %variant.name,
        mode = %policy.mode,
        layer = policy.layer_name(),
        target = %variant.transform.target,
        "building variant"
    );

    let interceptor: SharedInterceptor = Arc::new(
        BoundaryInterceptor::new(plan.resolver(), classifier, policy, plan.externals_set())
            .with_external_alias(variant.external_alias.clone()),
    );

    let artifacts = bundler.bundle(plan.request(variant), interceptor).await?;

    if !write {
        return Ok(Vec::new());
    }
    write_artifacts(plan.out_dir(), &artifacts)
}
