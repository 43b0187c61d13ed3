//! Error types for the cdnpack CLI.
//!
//! [`CliError`] wraps the bundler's own errors so that every failure reaching
//! `main` still carries its `miette` diagnostic code and help.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// `cdnpack.toml` or `CDNPACK_*` could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The loaded configuration describes an unusable registry
    #[error(transparent)]
    Registry(#[from] cdnpack_bundler::ConfigError),

    /// A production build failed
    #[error(transparent)]
    Build(#[from] cdnpack_bundler::BuildError),

    /// A source root could not be watched
    #[error(transparent)]
    Watch(#[from] cdnpack_bundler::WatchError),

    /// I/O errors outside the bundler
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a cdnpack.toml file or drop --config", .0.display())]
    NotFound(PathBuf),

    /// The merged configuration does not deserialize
    #[error("Invalid configuration: {0}\n\nHint: Check cdnpack.toml and CDNPACK_* variables")]
    Invalid(#[from] Box<figment::Error>),

    /// A bundle declares an empty folder, entry or dest
    #[error("Bundle '{bundle}' has an empty {field}")]
    EmptyPath { bundle: String, field: &'static str },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::Invalid(Box::new(error))
    }
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

mod report;

pub use report::cli_error_to_miette;

#[cfg(test)]
mod tests {
    use super::*;
    use cdnpack_bundler::{BuildError, CompileDiagnostic};

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("missing.toml"));
        let msg = err.to_string();
        assert!(msg.contains("missing.toml"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_cli_error_from_registry_error() {
        let err: CliError = cdnpack_bundler::ConfigError::DuplicateName("bar".into()).into();
        assert!(matches!(err, CliError::Registry(_)));
        assert!(err.to_string().contains("bar"));
    }

    #[test]
    fn test_build_error_keeps_diagnostic_code() {
        let err: CliError = BuildError::Compile {
            bundle: "foo".into(),
            diagnostic: CompileDiagnostic::ModuleSyntax(PathBuf::from("foo.js")),
        }
        .into();

        let report = cli_error_to_miette(err);
        let code = report.code().map(|code| code.to_string());
        assert_eq!(code.as_deref(), Some("cdnpack::build::compile"));
    }
}
