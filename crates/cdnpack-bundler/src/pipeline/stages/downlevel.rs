use oxc_transformer::TransformOptions;

use super::transform_with;
use crate::error::ConfigError;
use crate::pipeline::{Capability, ModuleSource, StageError, TransformStage};

/// Lowers syntax newer than the configured ECMAScript target.
#[derive(Debug, Clone)]
pub struct DownlevelStage {
    target: String,
}

impl DownlevelStage {
    /// Validate `target` (`es2015`, `es2019`, `esnext`, ...) and build the stage.
    pub fn new(target: &str) -> Result<Self, ConfigError> {
        TransformOptions::from_target(target).map_err(|reason| ConfigError::InvalidTarget {
            target: target.to_string(),
            reason: format!("{reason:?}"),
        })?;
        Ok(Self {
            target: target.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn options(&self) -> Result<TransformOptions, StageError> {
        TransformOptions::from_target(&self.target)
            .map_err(|reason| StageError::Transform(format!("{reason:?}")))
    }
}

impl TransformStage for DownlevelStage {
    fn name(&self) -> &'static str {
        "downlevel"
    }

    fn capability(&self) -> Capability {
        Capability::Downlevel
    }

    fn transform(&self, module: ModuleSource) -> Result<ModuleSource, StageError> {
        let code = transform_with(&module, &self.options()?)?;
        Ok(module.with_code(code))
    }
}
