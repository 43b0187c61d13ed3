//! Development watch loop.

use cdnpack_bundler::{BundleBuilder, BundleRegistry, Trigger, WatchCoordinator, WatchEvent};
use std::future::Future;
use std::path::Path;

use crate::error::Result;
use crate::ui;

/// Watch every bundle until Ctrl+C.
pub async fn execute(builder: BundleBuilder, registry: &BundleRegistry, cwd: &Path) -> Result<()> {
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    execute_until(builder, registry, cwd, shutdown).await?;
    Ok(())
}

/// Watch every bundle until `shutdown` resolves.
///
/// Returns the number of builds that completed. Failed builds and roots
/// that cannot be watched are reported and never end the loop.
pub async fn execute_until(
    builder: BundleBuilder,
    registry: &BundleRegistry,
    cwd: &Path,
    shutdown: impl Future<Output = ()>,
) -> Result<usize> {
    ui::info(&format!("watching {} bundles...", registry.len()));

    let (coordinator, mut events) = WatchCoordinator::watch_registry(builder, registry);
    tracing::debug!(watched = coordinator.bundles().len(), "watchers attached");

    tokio::pin!(shutdown);
    let mut completed = 0;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if matches!(event, WatchEvent::BuildCompleted(_)) {
                        completed += 1;
                    }
                    report(event, cwd);
                }
                None => break,
            },
            () = &mut shutdown => {
                tracing::debug!("shutting down");
                break;
            }
        }
    }

    drop(coordinator);
    Ok(completed)
}

fn report(event: WatchEvent, cwd: &Path) {
    match event {
        WatchEvent::BuildStarted { bundle, trigger } => match trigger {
            Trigger::Initial => tracing::debug!(%bundle, "initial build"),
            Trigger::Change(path) => {
                ui::info(&format!(
                    "{} changed, rebuilding [{bundle}] bundle",
                    ui::display_path(&path, cwd)
                ));
            }
        },
        WatchEvent::BuildCompleted(result) => ui::success(&format!(
            "built [{}] bundle in {}",
            ui::display_path(&result.output, cwd),
            ui::format_duration(result.duration)
        )),
        WatchEvent::BuildFailed { bundle, error } => {
            ui::error(&format!("failed to build [{bundle}] bundle"));
            eprintln!("{:?}", miette::Report::new(error));
        }
        WatchEvent::WatcherFailed { bundle, error } => {
            ui::warning(&format!("not watching [{bundle}] bundle: {error}"));
        }
    }
}
