use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use std::path::Path;

use crate::config::{CONFIG_FILE, ENV_PREFIX, ProjectConfig};
use crate::error::ConfigError;

impl ProjectConfig {
    /// Load configuration from every source.
    ///
    /// `config_path` must exist when given. Otherwise `cdnpack.toml` in
    /// `cwd` is used if present.
    pub fn load(cwd: &Path, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Ok(figment.extract()?)
    }
}
