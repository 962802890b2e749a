//! `crmbridge.toml` settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::egress::EgressOptions;
use crate::errors::ConfigError;

/// File name looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "crmbridge.toml";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "CRMBRIDGE_CONFIG";

/// Configuration stored in `crmbridge.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Defaults for update and create steps.
    #[serde(default)]
    pub update: EgressOptions,
}

impl BridgeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads the config from `explicit`, else from [`DEFAULT_CONFIG_FILE`] in `dir` when it
    /// exists, else returns the defaults. An explicit path that does not exist is an error.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = default_path(dir);
        if candidate.exists() {
            log::debug!("loading config from {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Command-line switches only ever turn a policy on.
    pub fn with_overrides(mut self, treat_null_as_ignore: bool, treat_empty_string_as_null: bool) -> Self {
        self.update.treat_null_as_ignore |= treat_null_as_ignore;
        self.update.treat_empty_string_as_null |= treat_empty_string_as_null;
        self
    }
}

pub fn default_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILE)
}
