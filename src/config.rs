//! Workspace configuration loaded from YAML

use crate::engine::DEFAULT_CONTENT_DIR;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the workspace base directory
pub const WORKSPACE_CONFIG_FILE: &str = "semwiki.yaml";

/// Default SQLite database file name, relative to the base directory
pub const DEFAULT_DATABASE_FILE: &str = "semwiki.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Which store persists the wiki
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    /// Ancestors shown per result when `--hierarchy` is given
    pub hierarchy_preview: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            hierarchy_preview: 5,
        }
    }
}

/// Semwiki configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub content_dir: String,
    pub backend: Backend,
    /// SQLite database path; relative paths resolve against the base directory
    pub database: Option<PathBuf>,
    pub search: SearchConfig,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            content_dir: DEFAULT_CONTENT_DIR.to_string(),
            backend: Backend::Json,
            database: None,
            search: SearchConfig::default(),
        }
    }
}

impl WikiConfig {
    /// User-level config file (`<config_dir>/semwiki/config.yaml`)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("semwiki").join("config.yaml"))
    }

    /// Load from `<base>/semwiki.yaml`, then the user config, then defaults
    pub fn load(base: &Path) -> Result<Self, ConfigError> {
        let local = base.join(WORKSPACE_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(&local);
        }
        match Self::user_config_path() {
            Some(user) if user.exists() => Self::from_file(&user),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes as null
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn database_path(&self, base: &Path) -> PathBuf {
        match &self.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join(DEFAULT_DATABASE_FILE),
        }
    }
}
