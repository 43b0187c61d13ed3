//! Single-bundle builds.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::engine::{BundleEngine, NativeEngine};
use crate::error::{BuildError, CompileDiagnostic};
use crate::registry::BundleDescriptor;
use crate::runtime::Runtime;

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Name of the bundle that was built
    pub bundle: String,
    /// Path of the written artifact
    pub output: PathBuf,
    /// Path of the external source map, if one was written
    pub sourcemap: Option<PathBuf>,
    /// Number of modules in the bundle
    pub modules: usize,
    /// Size of the artifact in bytes
    pub bytes: u64,
    pub duration: Duration,
}

/// Compiles and writes one descriptor at a time.
///
/// Cheap to clone; every clone shares the same engine.
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    engine: Arc<dyn BundleEngine>,
}

impl BundleBuilder {
    pub fn new(engine: Arc<dyn BundleEngine>) -> Self {
        Self { engine }
    }

    /// Builder backed by the [`NativeEngine`].
    pub fn native(runtime: Arc<dyn Runtime>) -> Self {
        Self::new(Arc::new(NativeEngine::new(runtime)))
    }

    pub fn engine(&self) -> &Arc<dyn BundleEngine> {
        &self.engine
    }

    /// Compile `descriptor`, then write it.
    ///
    /// Nothing is written when compilation fails. Errors carry the
    /// descriptor's name, and the destination for write failures.
    pub async fn build(&self, descriptor: &BundleDescriptor) -> Result<BuildResult, BuildError> {
        let span = tracing::info_span!("build", bundle = %descriptor.name);
        async {
            let start = Instant::now();
            tracing::debug!(entry = %descriptor.entry.display(), "compiling");

            let graph = self
                .engine
                .compile(descriptor)
                .await
                .map_err(|diagnostic| BuildError::Compile {
                    bundle: descriptor.name.clone(),
                    diagnostic,
                })?;

            let written = self
                .engine
                .write(&graph, &descriptor.output)
                .await
                .map_err(|failure| BuildError::Write {
                    bundle: descriptor.name.clone(),
                    path: failure.path,
                    error: failure.error,
                })?;

            let duration = start.elapsed();
            tracing::debug!(
                output = %written.artifact.display(),
                modules = graph.module_count(),
                ?duration,
                "build finished"
            );

            Ok(BuildResult {
                bundle: descriptor.name.clone(),
                output: written.artifact,
                sourcemap: written.sourcemap,
                modules: graph.module_count(),
                bytes: written.bytes as u64,
                duration,
            })
        }
        .instrument(span)
        .await
    }

    /// Build `descriptor` on its own tokio task.
    ///
    /// The task starts immediately; the returned future resolves with its
    /// outcome. A panic inside the build surfaces as a compile error for
    /// that descriptor instead of a `JoinError`.
    pub fn spawn(
        &self,
        descriptor: Arc<BundleDescriptor>,
    ) -> impl Future<Output = Result<BuildResult, BuildError>> + Send + 'static {
        let builder = self.clone();
        let name = descriptor.name.clone();
        let handle = tokio::spawn(async move { builder.build(&descriptor).await });

        async move {
            handle.await.unwrap_or_else(|join_error| {
                Err(BuildError::Compile {
                    bundle: name,
                    diagnostic: CompileDiagnostic::TaskFailed(join_error.to_string()),
                })
            })
        }
    }
}
