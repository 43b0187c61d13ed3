//! Transform pipeline and its mode-dependent composition.
//!
//! A [`Pipeline`] is an ordered list of [`TransformStage`]s applied to every
//! module of a bundle. [`compose`] is the only place that decides which
//! stages exist: development gets the base list, production gets the same
//! list followed by minification and debug stripping.

pub mod stages;

use oxc_span::SourceType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CompileDiagnostic, ConfigError};
use crate::mode::Mode;

pub use stages::{
    DefineStage, DownlevelStage, InteropStage, MinifyStage, StripDebugStage, TypeStripStage,
};

/// What a stage does to a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Removes type annotations
    TypeStrip,
    /// Substitutes the build-mode flag with a boolean literal
    DefineFlags,
    /// Lowers syntax to an older ECMAScript target
    Downlevel,
    /// Rewrites ES module syntax to `require`/`exports`
    Interop,
    /// Compresses and mangles
    Minify,
    /// Removes debugger statements and debug calls
    StripDebug,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeStrip => "type-strip",
            Self::DefineFlags => "define-flags",
            Self::Downlevel => "downlevel",
            Self::Interop => "interop",
            Self::Minify => "minify",
            Self::StripDebug => "strip-debug",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A module as it flows through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    pub path: PathBuf,
    pub code: String,
    pub source_type: SourceType,
}

impl ModuleSource {
    /// Create a module, inferring its source type from the file extension.
    ///
    /// Unknown extensions are treated as ES modules.
    pub fn new(path: impl Into<PathBuf>, code: impl Into<String>) -> Self {
        let path = path.into();
        let source_type = SourceType::from_path(&path).unwrap_or_else(|_| SourceType::mjs());
        Self {
            path,
            code: code.into(),
            source_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Same module with new code and an unchanged source type.
    pub fn with_code(self, code: String) -> Self {
        Self { code, ..self }
    }

    /// Same module with new code that is parsed as a script from now on.
    ///
    /// Language flags (TypeScript, JSX) are kept.
    pub fn into_script(self, code: String) -> Self {
        Self {
            code,
            source_type: self.source_type.with_script(true),
            ..self
        }
    }
}

/// Why a stage rejected a module.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    #[error("{0}")]
    Parse(String),

    #[error("unsupported syntax: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Transform(String),
}

/// A single transformation applied to every module of a bundle.
///
/// Implementations hold only immutable configuration so one instance can be
/// shared by every concurrent build.
pub trait TransformStage: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and diagnostics
    fn name(&self) -> &'static str;

    fn capability(&self) -> Capability;

    fn transform(&self, module: ModuleSource) -> Result<ModuleSource, StageError>;
}

/// Options shared by every composed pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineOptions {
    /// ECMAScript target for syntax lowering
    pub target: String,
    /// Identifier replaced by `true` in development and `false` in production
    pub flag: String,
    /// Objects whose method calls are removed in production
    pub strip: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            target: "es2019".to_string(),
            flag: "DEVELOPMENT".to_string(),
            strip: vec!["console".to_string(), "assert".to_string()],
        }
    }
}

/// Ordered, immutable list of stages.
///
/// Cloning is cheap; every clone shares the same stage instances.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn TransformStage>]>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn TransformStage>>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    pub fn stages(&self) -> &[Arc<dyn TransformStage>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        self.stages.iter().map(|stage| stage.capability()).collect()
    }

    /// Run `module` through every stage in order.
    ///
    /// Stops at the first stage that fails.
    pub fn run(&self, mut module: ModuleSource) -> Result<ModuleSource, CompileDiagnostic> {
        for stage in self.stages.iter() {
            tracing::trace!(stage = stage.name(), path = %module.path.display(), "running stage");
            let path = module.path.clone();
            module = stage.transform(module).map_err(|err| match err {
                StageError::Parse(message) => CompileDiagnostic::Parse { path, message },
                other => CompileDiagnostic::Stage {
                    stage: stage.name(),
                    path,
                    message: other.to_string(),
                },
            })?;
        }
        Ok(module)
    }
}

/// Build the pipeline for `mode`.
///
/// Development: type stripping, flag substitution, down-leveling, module
/// interop. Production: the same four stages followed by minification and
/// debug stripping.
pub fn compose(mode: Mode, options: &PipelineOptions) -> Result<Pipeline, ConfigError> {
    let mut stages: Vec<Arc<dyn TransformStage>> = vec![
        Arc::new(TypeStripStage),
        Arc::new(DefineStage::new(options.flag.clone(), mode.is_development())),
        Arc::new(DownlevelStage::new(&options.target)?),
        Arc::new(InteropStage),
    ];

    if mode.is_production() {
        stages.push(Arc::new(MinifyStage));
        stages.push(Arc::new(StripDebugStage::new(options.strip.clone())));
    }

    tracing::debug!(
        mode = %mode,
        stages = ?stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
        "composed pipeline"
    );

    Ok(Pipeline::new(stages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_extends_development() {
        let options = PipelineOptions::default();
        let dev = compose(Mode::Development, &options).unwrap();
        let prod = compose(Mode::Production, &options).unwrap();

        assert_eq!(prod.len(), dev.len() + 2);
        assert_eq!(prod.capabilities()[..dev.len()], dev.capabilities()[..]);
        assert_eq!(
            prod.capabilities()[dev.len()..],
            [Capability::Minify, Capability::StripDebug]
        );
    }

    #[test]
    fn test_development_stage_order() {
        let dev = compose(Mode::Development, &PipelineOptions::default()).unwrap();
        assert_eq!(
            dev.capabilities(),
            vec![
                Capability::TypeStrip,
                Capability::DefineFlags,
                Capability::Downlevel,
                Capability::Interop,
            ]
        );
    }

    #[test]
    fn test_unknown_target_is_a_config_error() {
        let options = PipelineOptions {
            target: "es1999".to_string(),
            ..Default::default()
        };
        let err = compose(Mode::Development, &options).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTarget { .. }));
    }

    #[test]
    fn test_clones_share_stages() {
        let pipeline = compose(Mode::Production, &PipelineOptions::default()).unwrap();
        let clone = pipeline.clone();
        for (a, b) in pipeline.stages().iter().zip(clone.stages()) {
            assert!(Arc::ptr_eq(a, b));
        }
    }

    #[test]
    fn test_flag_value_follows_mode() {
        let options = PipelineOptions::default();
        let source = ModuleSource::new("a.js", "if (DEVELOPMENT) { run(); }\n");

        let dev = compose(Mode::Development, &options).unwrap();
        let out = dev.stages()[1].transform(source.clone()).unwrap();
        assert!(out.code.contains("if (true)"));

        let prod = compose(Mode::Production, &options).unwrap();
        let out = prod.stages()[1].transform(source).unwrap();
        assert!(out.code.contains("if (false)"));
    }

    #[test]
    fn test_run_reports_parse_errors_with_path() {
        let pipeline = compose(Mode::Development, &PipelineOptions::default()).unwrap();
        let err = pipeline
            .run(ModuleSource::new("src/broken.js", "let = ;"))
            .unwrap_err();
        match err {
            CompileDiagnostic::Parse { path, .. } => assert_eq!(path, PathBuf::from("src/broken.js")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert_eq!(options.target, "es2019");
        assert_eq!(options.flag, "DEVELOPMENT");
        assert_eq!(options.strip, vec!["console", "assert"]);
    }
}
