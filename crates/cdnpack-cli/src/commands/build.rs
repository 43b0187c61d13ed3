//! One-shot build of every bundle.

use cdnpack_bundler::{BuildResult, BundleBuilder, BundleRegistry, build_all};
use std::path::Path;
use std::time::Instant;

use crate::error::Result;
use crate::ui;

/// Build the whole registry concurrently.
///
/// On failure nothing about the bundles that did succeed is reported; the
/// error names the failing bundle and is returned for `main` to print.
pub async fn execute(
    builder: &BundleBuilder,
    registry: &BundleRegistry,
    cwd: &Path,
) -> Result<Vec<BuildResult>> {
    ui::info(&format!("building {} bundles...", registry.len()));
    let start = Instant::now();

    let results = match build_all(builder, registry).await {
        Ok(results) => results,
        Err(err) => {
            ui::error(&format!("failed to build [{}] bundle", err.bundle()));
            return Err(err.into());
        }
    };

    ui::print_build_summary(&results, cwd);
    ui::success(&format!(
        "built {} bundles in {}",
        results.len(),
        ui::format_duration(start.elapsed())
    ));
    Ok(results)
}
