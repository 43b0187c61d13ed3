//! Logging setup for the cdnpack CLI.
//!
//! # Verbosity
//!
//! 1. `--verbose`: DEBUG for the cdnpack crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`, when set
//! 4. otherwise INFO for the cdnpack crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "cdnpack_bundler=debug,cdnpack_cli=debug";
const QUIET_FILTER: &str = "cdnpack_bundler=error,cdnpack_cli=error";
const DEFAULT_FILTER: &str = "cdnpack_bundler=info,cdnpack_cli=info";

/// Install the global tracing subscriber.
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_target(false) // keeps output clean
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
