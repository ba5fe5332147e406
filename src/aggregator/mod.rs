//! Unified configuration across global, project and plugin sources.
//!
//! Every list in a [`ClaudeConfig`] is ordered global, then project, then
//! each enabled plugin in discovery order. Nothing is cached: every call
//! re-reads the filesystem.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::artifacts::{Agent, Command, Hook, HookLoader, MarkdownArtifactLoader};
use crate::common::SourceType;
use crate::config::ServerConfig;
use crate::context::CLAUDE_DIR;
use crate::plugins::{
    Plugin, PluginDiscovery, PluginError, PluginStateManager, get_marketplace_manifest, id,
    is_enabled, plugin_roots,
};
use crate::skills::{Skill, SkillLoader};
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeConfig {
    pub skills: Vec<Skill>,
    pub commands: Vec<Command>,
    pub agents: Vec<Agent>,
    pub hooks: Vec<Hook>,
}

impl ClaudeConfig {
    /// Appends `other` after the entries already present.
    pub fn extend(&mut self, other: ClaudeConfig) {
        self.skills.extend(other.skills);
        self.commands.extend(other.commands);
        self.agents.extend(other.agents);
        self.hooks.extend(other.hooks);
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.commands.is_empty()
            && self.agents.is_empty()
            && self.hooks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigAggregator {
    global_dir: PathBuf,
    project_root: PathBuf,
    skills: SkillLoader,
    commands: MarkdownArtifactLoader,
    agents: MarkdownArtifactLoader,
    hooks: HookLoader,
    discovery: PluginDiscovery,
    state: PluginStateManager,
}

impl ConfigAggregator {
    /// `global_dir` is the global `.claude` directory; the project's is
    /// `<project_root>/.claude`.
    pub fn new(global_dir: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            global_dir: global_dir.into(),
            project_root: project_root.into(),
            skills: SkillLoader::new(),
            commands: MarkdownArtifactLoader::commands(),
            agents: MarkdownArtifactLoader::agents(),
            hooks: HookLoader::new(),
            discovery: PluginDiscovery::new(),
            state: PluginStateManager::new(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.global_claude_dir(), &config.project_root)
    }

    pub fn with_discovery(mut self, discovery: PluginDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_state_manager(mut self, state: PluginStateManager) -> Self {
        self.state = state;
        self
    }

    pub fn state_manager(&self) -> &PluginStateManager {
        &self.state
    }

    pub fn global_dir(&self) -> &Path {
        &self.global_dir
    }

    pub fn project_dir(&self) -> PathBuf {
        self.project_root.join(CLAUDE_DIR)
    }

    /// Loads all four artifact kinds under `base` concurrently.
    pub async fn get_config(
        &self,
        base: &Path,
        source: SourceType,
        include_contents: bool,
    ) -> ClaudeConfig {
        let (skills, commands, agents, hooks) = tokio::join!(
            self.skills.load(base, source, include_contents),
            self.commands.load(base, source),
            self.agents.load(base, source),
            self.hooks.load(base, source),
        );
        ClaudeConfig {
            skills,
            commands,
            agents,
            hooks,
        }
    }

    pub async fn global_config(&self, include_contents: bool) -> ClaudeConfig {
        self.get_config(&self.global_dir, SourceType::Global, include_contents)
            .await
    }

    pub async fn project_config(&self, include_contents: bool) -> ClaudeConfig {
        self.get_config(&self.project_dir(), SourceType::Project, include_contents)
            .await
    }

    /// Discovered plugins with `enabled` resolved against the project's
    /// overrides.
    pub async fn list_plugins(&self) -> Vec<Plugin> {
        let roots = plugin_roots(&self.global_dir, self.project_dir());
        let (mut plugins, states) = tokio::join!(
            self.discovery.discover(&roots),
            self.state.get_states(&self.project_root),
        );
        for plugin in &mut plugins {
            plugin.enabled = is_enabled(&states, &plugin.id);
        }
        plugins
    }

    pub async fn toggle_plugin(&self, plugin_id: &str, enabled: bool) -> Result<()> {
        self.state
            .set_state(&self.project_root, plugin_id, enabled)
            .await
    }

    /// Full contents of one plugin.
    ///
    /// Marketplace entries contribute only the skills their manifest entry
    /// declares, resolved relative to the marketplace directory at `path`.
    pub async fn plugin_contents(
        &self,
        path: &Path,
        plugin_id: &str,
        is_marketplace: bool,
        include_contents: bool,
    ) -> Result<ClaudeConfig> {
        if !is_marketplace {
            return Ok(self
                .get_config(path, SourceType::Plugin, include_contents)
                .await);
        }

        let manifest = get_marketplace_manifest(path).await.ok_or_else(|| {
            PluginError::ManifestNotFound {
                path: path.to_path_buf(),
            }
        })?;
        let entry = manifest
            .plugin(id::plugin_name(plugin_id))
            .ok_or_else(|| PluginError::NotInMarketplace {
                id: plugin_id.to_string(),
                path: path.to_path_buf(),
            })?;

        Ok(ClaudeConfig {
            skills: self
                .skills
                .load_paths(path, &entry.skills, include_contents)
                .await,
            ..Default::default()
        })
    }

    /// Global, project and enabled-plugin configuration merged in that order.
    ///
    /// A plugin whose contents cannot be resolved is skipped with a warning.
    pub async fn get_aggregated_config(&self, include_contents: bool) -> ClaudeConfig {
        let (global, project, plugins) = tokio::join!(
            self.global_config(include_contents),
            self.project_config(include_contents),
            self.list_plugins(),
        );

        let enabled: Vec<&Plugin> = plugins.iter().filter(|p| p.enabled).collect();
        let resolved = join_all(enabled.iter().map(|plugin| {
            self.plugin_contents(
                &plugin.path,
                &plugin.id,
                plugin.is_marketplace(),
                include_contents,
            )
        }))
        .await;

        let mut config = global;
        config.extend(project);
        for (plugin, contents) in enabled.iter().zip(resolved) {
            match contents {
                Ok(contents) => config.extend(contents),
                Err(e) => tracing::warn!("Skipping plugin '{}': {}", plugin.id, e),
            }
        }

        if include_contents {
            for skill in config.skills.iter_mut().filter(|s| !s.has_contents()) {
                self.skills.populate_contents(skill).await;
            }
        }

        tracing::debug!(
            "Aggregated {} skills, {} commands, {} agents, {} hooks from {} enabled plugins",
            config.skills.len(),
            config.commands.len(),
            config.agents.len(),
            config.hooks.len(),
            enabled.len()
        );
        config
    }
}
