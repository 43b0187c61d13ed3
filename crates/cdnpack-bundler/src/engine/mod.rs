//! Compile and write collaborators.
//!
//! [`BundleEngine`] is the seam between the orchestration layer and the
//! actual bundling work. The builder only ever calls `compile` followed by
//! `write`; [`NativeEngine`] is the implementation shipped with the crate.

mod compile;
mod helpers;
mod render;
mod resolve;

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CompileDiagnostic, WriteFailure};
use crate::registry::{BundleDescriptor, OutputSpec, SourceMapMode};
use crate::runtime::Runtime;

/// Compile/write backend used by the builder.
#[async_trait]
pub trait BundleEngine: Send + Sync + std::fmt::Debug {
    /// Produce the module graph of `descriptor`, every module already run
    /// through the descriptor's pipeline.
    async fn compile(&self, descriptor: &BundleDescriptor) -> Result<BundleGraph, CompileDiagnostic>;

    /// Render `graph` according to `output` and persist it.
    async fn write(&self, graph: &BundleGraph, output: &OutputSpec)
    -> Result<WrittenBundle, WriteFailure>;
}

/// How a module refers to one of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRef {
    /// Index into [`BundleGraph::modules`]
    Internal(usize),
    /// Module provided by the host environment
    External(String),
}

/// A module after the pipeline ran.
#[derive(Debug, Clone)]
pub struct BundledModule {
    pub path: PathBuf,
    /// Stable id relative to the bundle root, used in source maps
    pub id: String,
    /// Original source text
    pub source: String,
    /// Transformed code
    pub code: String,
    /// `require` specifier -> target, in first-use order
    pub dependencies: IndexMap<String, ModuleRef>,
}

/// Compiled bundle: the entry first, then every reachable module in
/// breadth-first discovery order.
#[derive(Debug, Clone)]
pub struct BundleGraph {
    pub entry: PathBuf,
    pub modules: Vec<BundledModule>,
    pub externals: IndexSet<String>,
}

impl BundleGraph {
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

/// Paths produced by a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenBundle {
    pub artifact: PathBuf,
    pub sourcemap: Option<PathBuf>,
    pub bytes: usize,
}

/// Engine backed by the oxc stages and a [`Runtime`].
#[derive(Debug, Clone)]
pub struct NativeEngine {
    runtime: Arc<dyn Runtime>,
}

impl NativeEngine {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }
}

#[async_trait]
impl BundleEngine for NativeEngine {
    async fn compile(&self, descriptor: &BundleDescriptor) -> Result<BundleGraph, CompileDiagnostic> {
        compile::compile(self.runtime.as_ref(), descriptor).await
    }

    async fn write(
        &self,
        graph: &BundleGraph,
        output: &OutputSpec,
    ) -> Result<WrittenBundle, WriteFailure> {
        let dest = absolute(self.runtime.cwd(), &output.dest);
        let rendered = render::render(graph, output);

        let mut code = rendered.code;
        let mut map_file = None;
        match (output.sourcemap, rendered.map) {
            (Some(SourceMapMode::External), Some(map)) => {
                let map_path = map_path_for(&dest);
                let file_name = map_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                code.push_str(&format!("//# sourceMappingURL={file_name}\n"));
                map_file = Some((map_path, map.to_json_string()));
            }
            (Some(SourceMapMode::Inline), Some(map)) => {
                code.push_str(&format!("//# sourceMappingURL={}\n", map.to_data_url()));
            }
            _ => {}
        }

        if let Some(parent) = dest.parent() {
            self.runtime
                .create_dir(parent, true)
                .await
                .map_err(|error| WriteFailure {
                    path: dest.clone(),
                    error,
                })?;
        }

        self.runtime
            .write_file(&dest, code.as_bytes())
            .await
            .map_err(|error| WriteFailure {
                path: dest.clone(),
                error,
            })?;

        if let Some((map_path, json)) = &map_file {
            self.runtime
                .write_file(map_path, json.as_bytes())
                .await
                .map_err(|error| WriteFailure {
                    path: map_path.clone(),
                    error,
                })?;
        }

        tracing::info!(
            artifact = %dest.display(),
            bytes = code.len(),
            modules = graph.modules.len(),
            "wrote bundle"
        );

        Ok(WrittenBundle {
            artifact: dest,
            sourcemap: map_file.map(|(path, _)| path),
            bytes: code.len(),
        })
    }
}

/// `path` made absolute against `cwd` and normalized.
pub(crate) fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        cwd.join(path).clean()
    }
}

fn map_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}
