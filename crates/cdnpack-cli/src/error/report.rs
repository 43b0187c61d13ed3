//! Miette report conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert a [`CliError`] into a miette report.
///
/// Bundler errors already implement `Diagnostic`, so they keep their codes
/// and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Registry(e) => Report::new(e),
        CliError::Build(e) => Report::new(e),
        CliError::Watch(e) => Report::new(e),
        CliError::Config(e) => miette::miette!("{}", e),
        CliError::Io(e) => miette::miette!("I/O error: {}", e),
    }
}
