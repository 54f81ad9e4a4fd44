//! Rolldown plugin that routes every import through an [`ImportInterceptor`].
//!
//! Runs as the only `resolve_id` hook of a variant build. Entry resolution is
//! passed through untouched; every other import is classified and either left
//! to Rolldown (inline), claimed as external, or failed. Failures are recorded
//! as structured errors so the caller can surface them instead of Rolldown's
//! stringly plugin diagnostic.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

use crate::Error;
use crate::interceptor::{EdgeDecision, ImportInterceptor, SharedInterceptor};

/// Plugin enforcing a variant's layering policy during resolution.
#[derive(Debug)]
pub struct BoundaryPlugin {
    interceptor: SharedInterceptor,
    failures: Arc<Mutex<Vec<Error>>>,
}

impl BoundaryPlugin {
    pub fn new(interceptor: SharedInterceptor) -> Self {
        Self {
            interceptor,
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drain errors recorded by the resolve hook, ordered deterministically.
    pub fn take_failures(&self) -> Vec<Error> {
        let mut failures = std::mem::take(&mut *self.failures.lock());
        failures.sort_by_key(|e| e.to_string());
        failures.dedup_by_key(|e| e.to_string());
        failures
    }
}

impl Plugin for BoundaryPlugin {
    fn name(&self) -> Cow<'static, str> {
        "strata-boundary".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let interceptor = Arc::clone(&self.interceptor);
        let failures = Arc::clone(&self.failures);
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(|s| s.to_string());

        async move {
            // Entry points and virtual modules are not import edges.
            let Some(importer) = importer else {
                return Ok(None);
            };
            if importer.starts_with('\0') {
                return Ok(None);
            }

            match interceptor.intercept(&specifier, &PathBuf::from(&importer)) {
                Ok(EdgeDecision::Inline) => Ok(None),
                Ok(EdgeDecision::External { id }) => Ok(Some(HookResolveIdOutput {
                    id: id.into(),
                    external: Some(ResolvedExternal::Bool(true)),
                    ..Default::default()
                })),
                Err(err) => {
                    let message = err.to_string();
                    failures.lock().push(err);
                    Err(anyhow::anyhow!(message))
                }
            }
        }
    }
}
