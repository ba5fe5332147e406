//! Server configuration: where docs live, which project is open and whose
//! home directory holds the global `.claude` config.
//!
//! ```rust,no_run
//! use smart_docs::config::ServerConfig;
//!
//! # fn example() -> Result<(), smart_docs::config::ConfigError> {
//! let config = ServerConfig::from_env()?;
//! println!("{}", config.settings_path().display());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::common::home_dir;
use crate::context::CLAUDE_DIR;
use crate::plugins::{PluginRoot, plugin_roots, settings_path};

pub const DOCS_PATH_VAR: &str = "SMART_DOCS_PATH";
pub const PROJECT_ROOT_VAR: &str = "SMART_DOCS_PROJECT_ROOT";
pub const HOME_DIR_VAR: &str = "SMART_DOCS_HOME_DIR";

/// Errors that can occur while resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required key not set
    #[error("Key not found: {key}")]
    NotFound {
        /// The missing key
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub docs_path: PathBuf,
    pub project_root: PathBuf,
    pub home_dir: PathBuf,
}

impl ServerConfig {
    pub fn new(
        docs_path: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
        home_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            docs_path: docs_path.into(),
            project_root: project_root.into(),
            home_dir: home_dir.into(),
        }
    }

    /// Reads `SMART_DOCS_PATH`, `SMART_DOCS_PROJECT_ROOT` and
    /// `SMART_DOCS_HOME_DIR`. The home directory defaults to the platform's.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::NotFound { key: key.into() })
        };

        let docs_path = PathBuf::from(required(DOCS_PATH_VAR)?);
        let project_root = PathBuf::from(required(PROJECT_ROOT_VAR)?);
        let home_dir = match lookup(HOME_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => home_dir().ok_or_else(|| ConfigError::NotFound {
                key: HOME_DIR_VAR.into(),
            })?,
        };

        let config = Self::new(docs_path, project_root, home_dir);
        config.validate()?;
        Ok(config)
    }

    /// All paths must be absolute.
    pub fn validate(&self) -> ConfigResult<()> {
        for (key, path) in [
            (DOCS_PATH_VAR, &self.docs_path),
            (PROJECT_ROOT_VAR, &self.project_root),
            (HOME_DIR_VAR, &self.home_dir),
        ] {
            if !path.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("{} is not an absolute path", path.display()),
                });
            }
        }
        Ok(())
    }

    pub fn global_claude_dir(&self) -> PathBuf {
        self.home_dir.join(CLAUDE_DIR)
    }

    pub fn project_claude_dir(&self) -> PathBuf {
        self.project_root.join(CLAUDE_DIR)
    }

    pub fn settings_path(&self) -> PathBuf {
        settings_path(&self.project_root)
    }

    /// Global root first, then project.
    pub fn plugin_roots(&self) -> Vec<PluginRoot> {
        plugin_roots(self.global_claude_dir(), self.project_claude_dir())
    }
}
