//! Error taxonomy of the orchestrator.
//!
//! - [`ConfigError`]: the registry or pipeline configuration is unusable.
//!   Always fatal at startup.
//! - [`BuildError`]: one bundle failed to compile or to be written. Carries
//!   the failing bundle's name so aggregate failures point at their origin.
//! - [`WatchError`]: a filesystem observer could not be attached.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::runtime::RuntimeError;

/// Configuration errors detected before any build starts.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// No bundle was declared
    #[error("the bundle registry is empty")]
    #[diagnostic(code(cdnpack::config::empty_registry), help("Declare at least one bundle"))]
    EmptyRegistry,

    /// Two descriptors share a name
    #[error("bundle '{0}' is declared more than once")]
    #[diagnostic(code(cdnpack::config::duplicate_name))]
    DuplicateName(String),

    /// Two descriptors would write the same artifact
    #[error("bundles '{first}' and '{second}' both write to {}", dest.display())]
    #[diagnostic(
        code(cdnpack::config::shared_destination),
        help("Every bundle needs its own output file")
    )]
    SharedDestination {
        first: String,
        second: String,
        dest: PathBuf,
    },

    /// A UMD bundle has no global name to assign its exports to
    #[error("UMD bundle '{0}' needs a non-empty global name")]
    #[diagnostic(code(cdnpack::config::missing_umd_name))]
    MissingUmdName(String),

    /// The down-leveling target is not understood
    #[error("unknown ECMAScript target '{target}': {reason}")]
    #[diagnostic(
        code(cdnpack::config::invalid_target),
        help("Use a target such as 'es2015', 'es2019' or 'esnext'")
    )]
    InvalidTarget { target: String, reason: String },
}

/// Why a bundle's module graph could not be compiled.
#[derive(Debug, Error, Diagnostic)]
pub enum CompileDiagnostic {
    /// A module could not be read
    #[error("failed to read {}: {error}", path.display())]
    #[diagnostic(code(cdnpack::compile::read))]
    Read { path: PathBuf, error: RuntimeError },

    /// A module is not UTF-8 text
    #[error("{} is not valid UTF-8", .0.display())]
    #[diagnostic(code(cdnpack::compile::encoding))]
    Encoding(PathBuf),

    /// A module does not parse
    #[error("syntax error in {}: {message}", path.display())]
    #[diagnostic(code(cdnpack::compile::syntax))]
    Parse { path: PathBuf, message: String },

    /// A transform stage rejected a module
    #[error("stage '{stage}' failed on {}: {message}", path.display())]
    #[diagnostic(code(cdnpack::compile::stage))]
    Stage {
        stage: &'static str,
        path: PathBuf,
        message: String,
    },

    /// An import could not be resolved
    #[error("cannot resolve '{specifier}' imported from {}", importer.display())]
    #[diagnostic(
        code(cdnpack::compile::unresolved),
        help(
            "Relative imports must point at an existing file; bare imports must be listed in the bundle's globals or be resolvable from node_modules"
        )
    )]
    Unresolved {
        specifier: String,
        importer: PathBuf,
    },

    /// ES module syntax survived the pipeline and cannot be linked
    #[error("{} still contains import/export declarations after the pipeline ran", .0.display())]
    #[diagnostic(
        code(cdnpack::compile::module_syntax),
        help("Include an interop stage in the pipeline")
    )]
    ModuleSyntax(PathBuf),

    /// The build task itself died
    #[error("build task failed: {0}")]
    #[diagnostic(code(cdnpack::compile::task))]
    TaskFailed(String),
}

/// The write collaborator could not produce the artifact.
#[derive(Debug, Error)]
#[error("failed to write {}: {error}", path.display())]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: RuntimeError,
}

/// A single bundle build failed.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// The entry module or its graph could not be compiled
    #[error("bundle '{bundle}' failed to compile: {diagnostic}")]
    #[diagnostic(code(cdnpack::build::compile))]
    Compile {
        bundle: String,
        diagnostic: CompileDiagnostic,
    },

    /// The compiled bundle could not be written
    #[error("bundle '{bundle}' could not be written to {}: {error}", path.display())]
    #[diagnostic(
        code(cdnpack::build::write),
        help("Check that the output directory exists or can be created and is writable")
    )]
    Write {
        bundle: String,
        path: PathBuf,
        error: RuntimeError,
    },
}

impl BuildError {
    /// Name of the bundle whose build failed.
    pub fn bundle(&self) -> &str {
        match self {
            Self::Compile { bundle, .. } | Self::Write { bundle, .. } => bundle,
        }
    }

    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile { .. })
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

/// A source root could not be observed.
#[derive(Debug, Error, Diagnostic)]
pub enum WatchError {
    /// The directory to observe does not exist
    #[error("cannot watch {}: directory not found", .0.display())]
    #[diagnostic(code(cdnpack::watch::missing_root))]
    MissingRoot(PathBuf),

    /// The platform watcher refused the directory
    #[error("cannot watch {}: {error}", root.display())]
    #[diagnostic(code(cdnpack::watch::notify))]
    Notify { root: PathBuf, error: notify::Error },
}
