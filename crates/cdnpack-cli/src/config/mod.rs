//! Project configuration with multi-source loading.
//!
//! The in-process defaults describe the framework bundle plus the `bar` and
//! `foo` components. An optional `cdnpack.toml` and `CDNPACK_*` variables
//! override them. Priority: environment > file > defaults.

mod conversions;
mod defaults;
mod loading;

use cdnpack_bundler::{ModuleFormat, PipelineOptions, ResolveOptions, SourceMapMode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "cdnpack.toml";

/// Prefix of configuration environment variables.
///
/// Nested keys are separated by a double underscore, e.g.
/// `CDNPACK_PIPELINE__TARGET=es2015`.
pub const ENV_PREFIX: &str = "CDNPACK_";

/// Everything needed to build the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Options of the one pipeline every bundle shares
    #[serde(default)]
    pub pipeline: PipelineOptions,

    /// Bundles in build order; the first one is the framework bundle
    #[serde(default = "default_bundles")]
    pub bundles: Vec<BundleConfig>,
}

/// One bundle as written in configuration.
///
/// `folder` and `dest` are relative to the working directory, `entry` is
/// relative to `folder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleConfig {
    pub name: String,

    /// Source root; every change under it rebuilds the bundle
    pub folder: PathBuf,

    pub entry: PathBuf,

    pub dest: PathBuf,

    pub format: ModuleFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<SourceMapMode>,

    /// Module id -> global provided by the page
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub globals: IndexMap<String, String>,

    #[serde(default)]
    pub resolve: ResolveOptions,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineOptions::default(),
            bundles: default_bundles(),
        }
    }
}
