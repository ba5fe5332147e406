//! # smart-docs
//!
//! Configuration aggregation and plugin discovery for a local docs and
//! `.claude` configuration browser.
//!
//! The crate reads skills, commands, agents and hooks from the global
//! (`~/.claude`) and project (`<project>/.claude`) directories and from
//! every enabled plugin, discovers standalone and marketplace plugins,
//! persists per-project plugin enablement and resolves the CLAUDE.md
//! context hierarchy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smart_docs::{ServerConfig, Services};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smart_docs::Error> {
//!     let services = Services::new(ServerConfig::new(
//!         "/work/docs",
//!         "/work",
//!         "/home/dev",
//!     ))?;
//!
//!     let config = services.aggregated_config(false).await;
//!     for skill in &config.skills {
//!         println!("{} ({})", skill.name, skill.source);
//!     }
//!
//!     for plugin in services.list_plugins().await {
//!         println!("{} enabled={}", plugin.id, plugin.enabled);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `watch` (default): [`watcher::FileWatcher`] built on `notify`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod aggregator;
pub mod artifacts;
pub mod common;
pub mod config;
pub mod context;
pub mod docs;
pub mod plugins;
pub mod services;
pub mod skills;
pub mod watcher;

pub use aggregator::{ClaudeConfig, ConfigAggregator};
pub use artifacts::{Agent, Command, Hook};
pub use common::{FileTreeNode, SourceType};
pub use config::{ConfigError, ServerConfig};
pub use context::{ClaudeMdFile, ClaudeMdNode, ContextScope, get_context_tree};
pub use docs::{MarkdownContent, MarkdownFile};
pub use plugins::{Plugin, PluginError, PluginRoot, PluginStateManager, discover_plugins};
pub use services::Services;
pub use skills::{Skill, SkillMetadata};
pub use watcher::{ChangeArea, ChangeKind, FileChangeEvent};

/// Error type for smart-docs operations.
///
/// Expected absence (missing directories, files or manifests) is never an
/// error; loaders return empty results instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to parse input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Path is absolute or escapes its root.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Settings document unreadable or not writable.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Plugin manifest or lookup failed.
    #[error(transparent)]
    Plugin(#[from] plugins::PluginError),

    /// File watcher could not be started.
    #[error("Watch error: {0}")]
    Watch(String),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Configuration, parsing, or invalid input
    Configuration,
    /// A requested file, manifest, or plugin does not exist
    NotFound,
    /// Internal errors (IO, JSON, watcher, settings)
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::Parse(_) | Error::InvalidPath(_) => {
                ErrorCategory::Configuration
            }

            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorCategory::NotFound,
            Error::Plugin(
                plugins::PluginError::ManifestNotFound { .. }
                | plugins::PluginError::NotInMarketplace { .. },
            ) => ErrorCategory::NotFound,
            Error::Plugin(
                plugins::PluginError::InvalidManifest { .. }
                | plugins::PluginError::InvalidName { .. }
                | plugins::PluginError::DuplicateId { .. },
            ) => ErrorCategory::Configuration,

            Error::Io(_)
            | Error::Json(_)
            | Error::Plugin(_)
            | Error::Settings(_)
            | Error::Watch(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::Config(format!("Key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
