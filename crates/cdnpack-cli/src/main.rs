//! cdnpack CLI - builds the CDN bundles once or keeps them rebuilt.
//!
//! The build mode comes from `NODE_ENV` and is resolved exactly once, here.

use cdnpack_bundler::Mode;
use cdnpack_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = cli::Cli::parse();

    // Initialize logging and colors based on global flags
    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let mode = Mode::from_env();

    // Convert CLI errors to miette diagnostics for error reporting
    commands::run(args, mode)
        .await
        .map_err(error::cli_error_to_miette)
}
