//! Explicitly constructed service bundle.
//!
//! [`Services`] owns everything a front end needs and is built once at
//! startup from a validated [`ServerConfig`].

use std::path::Path;

use crate::aggregator::{ClaudeConfig, ConfigAggregator};
use crate::common::FileTreeNode;
use crate::config::ServerConfig;
use crate::context::{ClaudeMdNode, get_context_tree};
use crate::docs::{self, MarkdownContent, MarkdownFile};
use crate::plugins::Plugin;
use crate::Result;

#[cfg(feature = "watch")]
use crate::watcher::{FileChangeEvent, FileWatcher, watch_targets};
#[cfg(feature = "watch")]
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct Services {
    config: ServerConfig,
    aggregator: ConfigAggregator,
    #[cfg(feature = "watch")]
    watcher: Option<FileWatcher>,
}

impl Services {
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let aggregator = ConfigAggregator::from_config(&config);
        tracing::info!(
            "Services initialized (docs: {}, project: {})",
            config.docs_path.display(),
            config.project_root.display()
        );
        Ok(Self {
            config,
            aggregator,
            #[cfg(feature = "watch")]
            watcher: None,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ServerConfig::from_env()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &ConfigAggregator {
        &self.aggregator
    }

    pub async fn aggregated_config(&self, include_contents: bool) -> ClaudeConfig {
        self.aggregator.get_aggregated_config(include_contents).await
    }

    pub async fn global_config(&self, include_contents: bool) -> ClaudeConfig {
        self.aggregator.global_config(include_contents).await
    }

    pub async fn project_config(&self, include_contents: bool) -> ClaudeConfig {
        self.aggregator.project_config(include_contents).await
    }

    pub async fn context_tree(&self) -> Vec<ClaudeMdNode> {
        get_context_tree(
            &self.config.home_dir,
            &self.config.project_root,
            &self.config.docs_path,
        )
        .await
    }

    pub async fn list_plugins(&self) -> Vec<Plugin> {
        self.aggregator.list_plugins().await
    }

    pub async fn toggle_plugin(&self, plugin_id: &str, enabled: bool) -> Result<()> {
        self.aggregator.toggle_plugin(plugin_id, enabled).await
    }

    pub async fn plugin_contents(
        &self,
        path: &Path,
        plugin_id: &str,
        is_marketplace: bool,
        include_contents: bool,
    ) -> Result<ClaudeConfig> {
        self.aggregator
            .plugin_contents(path, plugin_id, is_marketplace, include_contents)
            .await
    }

    pub async fn file_tree(&self) -> Result<FileTreeNode> {
        docs::file_tree(&self.config.docs_path).await
    }

    pub async fn markdown_files(&self) -> Vec<MarkdownFile> {
        docs::list_markdown_files(&self.config.docs_path).await
    }

    pub async fn read_markdown(&self, relative: &str) -> Result<MarkdownContent> {
        docs::read_markdown(&self.config.docs_path, relative).await
    }

    /// Starts watching once. Returns the event stream on the first call and
    /// `None` if already watching.
    #[cfg(feature = "watch")]
    pub fn start_watching(&mut self) -> Result<Option<mpsc::UnboundedReceiver<FileChangeEvent>>> {
        if self.watcher.is_some() {
            return Ok(None);
        }
        let (watcher, events) = FileWatcher::start(watch_targets(&self.config)?)?;
        self.watcher = Some(watcher);
        Ok(Some(events))
    }

    #[cfg(feature = "watch")]
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    #[cfg(not(feature = "watch"))]
    pub fn is_watching(&self) -> bool {
        false
    }

    pub fn shutdown(&mut self) {
        self.stop_watching();
        tracing::info!("Services shut down");
    }

    #[cfg(feature = "watch")]
    fn stop_watching(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
    }

    #[cfg(not(feature = "watch"))]
    fn stop_watching(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn services(root: &Path) -> Services {
        Services::new(ServerConfig::new(
            root.join("docs"),
            root.join("project"),
            root.join("home"),
        ))
        .unwrap()
    }

    #[test]
    fn test_relative_config_rejected() {
        let err = Services::new(ServerConfig::new("docs", "/p", "/h")).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[tokio::test]
    async fn test_empty_environment() {
        let dir = tempdir().unwrap();
        let services = services(dir.path());
        assert!(services.aggregated_config(false).await.is_empty());
        assert!(services.list_plugins().await.is_empty());
        assert!(services.context_tree().await.is_empty());
        assert!(services.markdown_files().await.is_empty());
    }

    #[cfg(feature = "watch")]
    #[tokio::test]
    async fn test_watch_lifecycle() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        let mut services = services(dir.path());

        assert!(!services.is_watching());
        assert!(services.start_watching().unwrap().is_some());
        assert!(services.is_watching());
        assert!(services.start_watching().unwrap().is_none());

        services.shutdown();
        assert!(!services.is_watching());
    }
}
