use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::id;
use super::manifest::{PluginManifest, Repository};
use super::marketplace::MarketplaceManifest;
use super::{PluginError, get_marketplace_manifest};
use crate::artifacts::{AGENTS_DIR, COMMANDS_DIR, HOOKS_DIR};
use crate::common::{
    DirEntryInfo, SourceType, count_entries, is_excluded_dir, is_hidden, is_markdown,
    is_shell_script, read_dir_sorted,
};
use crate::skills::SKILLS_DIR;

pub const PLUGINS_DIR: &str = "plugins";

/// How many directory levels below `plugins/` are examined.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// A configuration directory whose `plugins/` subdirectory is searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRoot {
    pub path: PathBuf,
    pub source: SourceType,
}

impl PluginRoot {
    pub fn new(path: impl Into<PathBuf>, source: SourceType) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.path.join(PLUGINS_DIR)
    }
}

/// Roots in discovery order: the global `.claude` directory, then the
/// project's. Earlier roots win duplicate ids.
pub fn plugin_roots(global_dir: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Vec<PluginRoot> {
    vec![
        PluginRoot::new(global_dir, SourceType::Global),
        PluginRoot::new(project_dir, SourceType::Project),
    ]
}

/// Per-kind component counts, used for summaries without loading content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCounts {
    pub skill_count: usize,
    pub command_count: usize,
    pub agent_count: usize,
    pub hook_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    /// `name` for standalone plugins, `name@marketplace` for marketplace entries.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub source: SourceType,
    /// Plugin directory, or the marketplace directory for marketplace entries.
    pub path: PathBuf,
    pub enabled: bool,
    #[serde(flatten)]
    pub counts: ComponentCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Plugin {
    pub fn is_marketplace(&self) -> bool {
        self.marketplace.is_some()
    }

    /// Entry name inside its marketplace, or the plugin name for standalone plugins.
    pub fn plugin_name(&self) -> &str {
        id::plugin_name(&self.id)
    }

    async fn standalone(manifest: PluginManifest, path: PathBuf, source: SourceType) -> Self {
        let counts = count_components(&path).await;
        Self {
            id: manifest.name.clone(),
            name: manifest.display_name().to_string(),
            description: manifest.description,
            version: manifest.version,
            source,
            path,
            enabled: true,
            counts,
            marketplace: None,
            url: manifest
                .repository
                .map(Repository::into_url)
                .or(manifest.homepage),
        }
    }

    fn from_marketplace(manifest: &MarketplaceManifest, path: &Path, source: SourceType) -> Vec<Self> {
        manifest
            .plugins
            .iter()
            .map(|entry| Self {
                id: id::compose(&entry.name, &manifest.name),
                name: entry.name.clone(),
                description: entry
                    .description
                    .clone()
                    .or_else(|| manifest.description().map(str::to_string)),
                version: entry
                    .version
                    .clone()
                    .or_else(|| manifest.version().map(str::to_string)),
                source,
                path: path.to_path_buf(),
                enabled: true,
                counts: ComponentCounts {
                    skill_count: entry.skills.len(),
                    command_count: entry.commands.len(),
                    agent_count: entry.agents.len(),
                    hook_count: entry.hooks.len(),
                },
                marketplace: Some(manifest.name.clone()),
                url: entry.url().map(str::to_string),
            })
            .collect()
    }
}

async fn count_components(plugin_dir: &Path) -> ComponentCounts {
    let markdown = |e: &DirEntryInfo| e.is_file && is_markdown(&e.path);
    let skills_dir = plugin_dir.join(SKILLS_DIR);
    let commands_dir = plugin_dir.join(COMMANDS_DIR);
    let agents_dir = plugin_dir.join(AGENTS_DIR);
    let hooks_dir = plugin_dir.join(HOOKS_DIR);
    let (skill_count, command_count, agent_count, hook_count) = tokio::join!(
        count_entries(&skills_dir, |e| e.is_dir),
        count_entries(&commands_dir, markdown),
        count_entries(&agents_dir, markdown),
        count_entries(&hooks_dir, |e| e.is_file && is_shell_script(&e.path)),
    );
    ComponentCounts {
        skill_count,
        command_count,
        agent_count,
        hook_count,
    }
}

/// What a candidate directory turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryKind {
    Plugin(PluginManifest),
    Marketplace(MarketplaceManifest),
    Neither,
}

/// Classifies a directory from its manifest probes; a plugin manifest wins
/// over a marketplace manifest.
pub fn classify(
    plugin: Option<PluginManifest>,
    marketplace: Option<MarketplaceManifest>,
) -> DirectoryKind {
    match (plugin, marketplace) {
        (Some(manifest), _) => DirectoryKind::Plugin(manifest),
        (None, Some(manifest)) => DirectoryKind::Marketplace(manifest),
        (None, None) => DirectoryKind::Neither,
    }
}

/// Whether the children of a directory at `depth` are examined.
/// Entries directly inside `plugins/` are at depth 1.
pub fn should_descend(depth: usize, max_depth: usize) -> bool {
    depth < max_depth
}

/// Keeps the first plugin for each id and drops later duplicates with a warning.
pub fn dedupe_plugins(plugins: Vec<Plugin>) -> Vec<Plugin> {
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut unique = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        if let Some(first) = seen.get(&plugin.id) {
            let err = PluginError::DuplicateId {
                id: plugin.id.clone(),
                first: first.clone(),
                second: plugin.path.clone(),
            };
            tracing::warn!("{}; keeping the first", err);
            continue;
        }
        seen.insert(plugin.id.clone(), plugin.path.clone());
        unique.push(plugin);
    }

    unique
}

#[derive(Debug, Clone, Copy)]
pub struct PluginDiscovery {
    max_depth: usize,
}

impl Default for PluginDiscovery {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl PluginDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Searches `<root>/plugins` of every root, in order, for plugins and
    /// marketplaces. Unreadable directories and bad manifests are skipped.
    pub async fn discover(&self, roots: &[PluginRoot]) -> Vec<Plugin> {
        let mut plugins = Vec::new();
        for root in roots {
            self.scan(root.plugins_dir(), 1, root.source, &mut plugins)
                .await;
        }
        dedupe_plugins(plugins)
    }

    fn scan<'a>(
        &'a self,
        dir: PathBuf,
        depth: usize,
        source: SourceType,
        plugins: &'a mut Vec<Plugin>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let entries = match read_dir_sorted(&dir, true).await {
                Ok(entries) => entries,
                Err(e) => {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!("Failed to read {}: {}", dir.display(), e);
                    }
                    return;
                }
            };

            for entry in entries {
                if !entry.is_dir || is_hidden(&entry.name) || is_excluded_dir(&entry.name) {
                    continue;
                }

                match Self::probe(&entry.path).await {
                    DirectoryKind::Plugin(manifest) => {
                        tracing::debug!("Found plugin '{}' at {}", manifest.name, entry.path.display());
                        plugins.push(Plugin::standalone(manifest, entry.path, source).await);
                    }
                    DirectoryKind::Marketplace(manifest) => {
                        tracing::debug!(
                            "Found marketplace '{}' with {} plugins at {}",
                            manifest.name,
                            manifest.plugins.len(),
                            entry.path.display()
                        );
                        plugins.extend(Plugin::from_marketplace(&manifest, &entry.path, source));
                    }
                    DirectoryKind::Neither => {
                        if should_descend(depth, self.max_depth) {
                            self.scan(entry.path, depth + 1, source, plugins).await;
                        }
                    }
                }
            }
        })
    }

    async fn probe(dir: &Path) -> DirectoryKind {
        let plugin = match PluginManifest::load(dir).await {
            Ok(manifest) => Some(manifest),
            Err(PluginError::ManifestNotFound { .. }) => None,
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        };
        if plugin.is_some() {
            return classify(plugin, None);
        }
        classify(None, get_marketplace_manifest(dir).await)
    }
}
