//! cdnpack CLI - production builds and watch rebuilds of CDN bundles.
//!
//! # Architecture
//!
//! - [`cli`] - ambient command-line flags
//! - [`config`] - `cdnpack.toml` / `CDNPACK_*` loading and the default bundles
//! - [`commands`] - production build and development watch loop
//! - [`error`] - CLI error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines for the terminal
//!
//! The mode (`NODE_ENV=production` or not) is never a flag; `main` resolves
//! it once and hands it to [`commands::run`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
