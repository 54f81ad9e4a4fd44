//! Shared test utilities for strata-bundler tests
//!
//! Provides temporary project fixtures and [`GraphBundler`], an in-memory
//! bundler that walks a static import graph instead of parsing sources.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use path_clean::PathClean;
use strata_bundler::{
    Artifact, BundleRequest, Bundler, EdgeDecision, OutputFormat, OutputSpec, Result,
    SharedInterceptor,
};
use tempfile::TempDir;

/// Write `files` (root-relative path, contents) under `<tmp>/src`.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (path, contents) in files {
        let path = dir.path().join("src").join(path);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(&path, contents).expect("write fixture");
    }
    dir
}

/// Source root of a fixture created by [`project`].
pub fn src(dir: &TempDir) -> PathBuf {
    dir.path().join("src")
}

/// CommonJS and ES module outputs under `dist/`.
pub fn outputs(stem: &str) -> [OutputSpec; 2] {
    [
        OutputSpec::new(OutputFormat::Cjs, format!("dist/{stem}.cjs.js")),
        OutputSpec::new(OutputFormat::Esm, format!("dist/{stem}.esm.js")),
    ]
}

/// In-memory bundler over a static import graph.
///
/// Keys are root-relative file paths; values are the specifiers each file
/// imports. The emitted "code" lists every inlined module and external id,
/// one per line, so tests can assert on what a real bundler would have done.
#[derive(Debug, Default, Clone)]
pub struct GraphBundler {
    graph: BTreeMap<String, Vec<String>>,
}

impl GraphBundler {
    pub fn new(edges: &[(&str, &[&str])]) -> Self {
        Self {
            graph: edges
                .iter()
                .map(|(file, imports)| {
                    (
                        file.to_string(),
                        imports.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Materialise every graph node as a file so the interceptor's existence
    /// probe succeeds.
    pub fn project(&self) -> TempDir {
        let files: Vec<(&str, &str)> = self
            .graph
            .keys()
            .map(|k| (k.as_str(), "export {};\n"))
            .collect();
        project(&files)
    }

    fn locate(&self, importer: &str, specifier: &str) -> Option<String> {
        let base = Path::new(importer).parent().unwrap_or(Path::new(""));
        let joined = base.join(specifier).clean();
        let joined = joined.to_string_lossy();
        let candidates = [
            joined.to_string(),
            format!("{joined}.ts"),
            format!("{joined}.tsx"),
            format!("{joined}.js"),
            format!("{joined}/index.ts"),
        ];
        candidates.into_iter().find(|c| self.graph.contains_key(c))
    }

    fn walk(&self, request: &BundleRequest, interceptor: &SharedInterceptor) -> Result<Vec<String>> {
        let entry = request
            .entry
            .strip_prefix(&request.root)
            .expect("entry under root")
            .to_string_lossy()
            .into_owned();

        let mut lines = vec![format!("inline {entry}")];
        let mut queue = VecDeque::from([entry.clone()]);
        let mut seen = vec![entry];

        while let Some(module) = queue.pop_front() {
            let importer = request.root.join(&module);
            for specifier in self.graph.get(&module).into_iter().flatten() {
                match interceptor.intercept(specifier, &importer)? {
                    EdgeDecision::External { id } => lines.push(format!("external {id}")),
                    EdgeDecision::Inline => {
                        let target = self
                            .locate(&module, specifier)
                            .expect("inline target in graph");
                        if !seen.contains(&target) {
                            lines.push(format!("inline {target}"));
                            seen.push(target.clone());
                            queue.push_back(target);
                        }
                    }
                }
            }
        }
        Ok(lines)
    }
}

#[async_trait]
impl Bundler for GraphBundler {
    fn name(&self) -> &str {
        "graph"
    }

    async fn bundle(
        &self,
        request: BundleRequest,
        interceptor: SharedInterceptor,
    ) -> Result<Vec<Artifact>> {
        let lines = self.walk(&request, &interceptor)?;
        Ok(request
            .outputs
            .iter()
            .map(|output| Artifact {
                format: output.format,
                file: output.file.clone(),
                code: format!("// {}\n{}\n", output.format, lines.join("\n")),
                map: output
                    .sourcemap
                    .then(|| r#"{"version":3,"sources":[],"mappings":""}"#.to_string()),
            })
            .collect())
    }
}
