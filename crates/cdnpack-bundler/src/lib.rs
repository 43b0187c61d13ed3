//! # cdnpack-bundler
//!
//! Builds a fixed registry of independent bundles (AMD components and a UMD
//! framework bundle) under one of two modes: a one-shot production build or a
//! long-running development watch loop.
//!
//! The crate is organised around a few small pieces:
//!
//! - [`mode`] - the production/development switch, resolved once at startup
//! - [`pipeline`] - transform stages and the mode-dependent [`compose`] function
//! - [`registry`] - immutable bundle descriptors and their output specs
//! - [`engine`] - the compile and write collaborators behind [`BundleEngine`]
//! - [`builder`] - compile-then-write for a single descriptor
//! - [`aggregate`] - concurrent fail-fast build of a whole registry
//! - [`watch`] - per-descriptor rebuilds driven by file change notifications
//!
//! ## Quick Start
//!
//! ```no_run
//! use cdnpack_bundler::{
//!     BundleBuilder, BundleDescriptor, BundleRegistry, Mode, NativeRuntime, OutputSpec,
//!     PipelineOptions, build_all, compose,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = compose(Mode::Production, &PipelineOptions::default())?;
//! let registry = BundleRegistry::new(vec![BundleDescriptor::new(
//!     "bar",
//!     "src/components/bar",
//!     "src/components/bar/bar.js",
//!     pipeline,
//!     OutputSpec::amd("fake-cdn/bar.js", Some("abc:bar")).global("aura", "$A"),
//! )])?;
//!
//! let builder = BundleBuilder::native(Arc::new(NativeRuntime::new(".")));
//! for result in build_all(&builder, &registry).await? {
//!     println!("built {}", result.output.display());
//! }
//! # Ok(()) }
//! ```

pub mod aggregate;
pub mod builder;
pub mod engine;
pub mod error;
pub mod mode;
pub mod pipeline;
pub mod registry;
pub mod runtime;
pub mod watch;

pub use aggregate::build_all;
pub use builder::{BuildResult, BundleBuilder};
pub use engine::{BundleEngine, BundleGraph, BundledModule, ModuleRef, NativeEngine, WrittenBundle};
pub use error::{BuildError, CompileDiagnostic, ConfigError, WatchError, WriteFailure};
pub use mode::{MODE_ENV_VAR, Mode};
pub use pipeline::{
    Capability, ModuleSource, Pipeline, PipelineOptions, StageError, TransformStage, compose,
};
pub use registry::{
    BundleDescriptor, BundleRegistry, ModuleFormat, OutputSpec, ResolveOptions, SourceMapMode,
};
pub use runtime::{NativeRuntime, Runtime, RuntimeError, RuntimeResult};
pub use watch::{
    BundleWatch, FileChange, SourceWatcher, Trigger, WatchCoordinator, WatchEvent, WatchState,
};
