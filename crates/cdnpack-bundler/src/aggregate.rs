//! Concurrent build of a whole registry.

use futures::future::try_join_all;

use crate::builder::{BuildResult, BundleBuilder};
use crate::error::BuildError;
use crate::registry::BundleRegistry;

/// Build every descriptor of `registry` concurrently.
///
/// Each build runs on its own task. Results come back in registry order.
/// The first failure to settle is returned as soon as it happens; builds
/// still in flight keep running detached and their results are discarded.
pub async fn build_all(
    builder: &BundleBuilder,
    registry: &BundleRegistry,
) -> Result<Vec<BuildResult>, BuildError> {
    tracing::debug!(bundles = registry.len(), "building registry");

    let builds = registry
        .iter()
        .map(|descriptor| builder.spawn(descriptor.clone()));

    let results = try_join_all(builds).await;
    if let Err(err) = &results {
        tracing::debug!(bundle = err.bundle(), "registry build failed");
    }
    results
}
