use cdnpack_bundler::{BundleDescriptor, BundleRegistry, Mode, OutputSpec, Pipeline, compose};
use path_clean::PathClean;
use std::path::Path;

use crate::config::{BundleConfig, ProjectConfig};
use crate::error::{ConfigError, Result};

impl ProjectConfig {
    /// Compose the pipeline for `mode` and validate the bundles into a
    /// registry, resolving paths against `cwd`.
    pub fn into_registry(self, mode: Mode, cwd: &Path) -> Result<BundleRegistry> {
        let pipeline = compose(mode, &self.pipeline)?;
        tracing::debug!(
            %mode,
            stages = ?pipeline.capabilities(),
            "pipeline composed"
        );

        let descriptors = self
            .bundles
            .into_iter()
            .map(|bundle| bundle.into_descriptor(pipeline.clone(), cwd))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(BundleRegistry::new(descriptors)?)
    }
}

impl BundleConfig {
    fn into_descriptor(
        self,
        pipeline: Pipeline,
        cwd: &Path,
    ) -> std::result::Result<BundleDescriptor, ConfigError> {
        for (field, path) in [("folder", &self.folder), ("entry", &self.entry), ("dest", &self.dest)] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath {
                    bundle: self.name.clone(),
                    field,
                });
            }
        }

        let root = cwd.join(&self.folder).clean();
        let entry = root.join(&self.entry).clean();
        let mut output = OutputSpec::new(cwd.join(&self.dest).clean(), self.format);
        output.sourcemap = self.sourcemap;
        output.globals = self.globals;

        Ok(BundleDescriptor::new(self.name, root, entry, pipeline, output).resolve(self.resolve))
    }
}
