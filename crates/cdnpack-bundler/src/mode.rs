//! Build mode selection.
//!
//! The mode is read from the environment exactly once, by the binary, and
//! then handed to [`compose`](crate::compose) and to the production/watch
//! dispatch as a plain value. Nothing else in the crate reads the
//! environment.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Environment variable that selects the build mode.
pub const MODE_ENV_VAR: &str = "NODE_ENV";

/// Operating mode of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One-shot optimized build of every bundle, then exit.
    Production,
    /// Long-running watch loop with unminified rebuilds.
    #[default]
    Development,
}

impl Mode {
    /// Resolve the mode from [`MODE_ENV_VAR`].
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MODE_ENV_VAR).ok().as_deref())
    }

    /// Resolve the mode from a raw environment value.
    ///
    /// Only `production` (case-insensitive, surrounding whitespace ignored)
    /// selects [`Mode::Production`]; anything else, including an unset
    /// variable, selects [`Mode::Development`].
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.trim().eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_env_value(Some(s)))
    }
}
