//! Production build and development watch loop.
//!
//! [`run`] loads the configuration, turns it into a registry for the given
//! mode and hands it to [`build`] or [`watch`].

pub mod build;
pub mod watch;

use cdnpack_bundler::{BundleBuilder, Mode, NativeRuntime};
use path_clean::PathClean;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::Cli;
use crate::config::ProjectConfig;
use crate::error::Result;

/// Dispatch on `mode`.
///
/// Production returns after the aggregate build settles. Development only
/// returns when interrupted or when loading fails.
pub async fn run(args: Cli, mode: Mode) -> Result<()> {
    let cwd = resolve_cwd(args.cwd)?;
    tracing::debug!(%mode, cwd = %cwd.display(), "starting");

    let config = ProjectConfig::load(&cwd, args.config.as_deref())?;
    let registry = config.into_registry(mode, &cwd)?;
    let builder = BundleBuilder::native(Arc::new(NativeRuntime::new(&cwd)));

    match mode {
        Mode::Production => build::execute(&builder, &registry, &cwd).await.map(|_| ()),
        Mode::Development => watch::execute(builder, &registry, &cwd).await,
    }
}

fn resolve_cwd(cwd: Option<PathBuf>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match cwd {
        Some(dir) => current.join(dir).clean(),
        None => current,
    })
}
