//! Command-line flags.
//!
//! There are no subcommands: the build mode is selected by `NODE_ENV`, and
//! the flags only affect where configuration is read from and how much is
//! printed.

use clap::Parser;
use std::path::PathBuf;

/// Build AMD/UMD bundles for a CDN, once (`NODE_ENV=production`) or on every change.
#[derive(Parser, Debug)]
#[command(name = "cdnpack")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to `cdnpack.toml` in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory bundle paths are resolved against
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_ambient_flags() {
        let cli = Cli::parse_from(["cdnpack", "--config", "custom.toml", "--cwd", "site", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(cli.cwd, Some(PathBuf::from("site")));
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["cdnpack", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_mode_is_not_a_flag() {
        assert!(Cli::try_parse_from(["cdnpack", "--production"]).is_err());
        assert!(Cli::try_parse_from(["cdnpack", "build"]).is_err());
    }
}
