//! Per-project plugin enablement, persisted under `enabledPlugins` in
//! `<project>/.claude/settings.json`.
//!
//! Only overrides are stored. A plugin without an entry is enabled.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{Error, Result};

pub const SETTINGS_FILE: &str = "settings.json";
pub const ENABLED_PLUGINS_KEY: &str = "enabledPlugins";

pub fn settings_path(project_root: &Path) -> PathBuf {
    project_root.join(".claude").join(SETTINGS_FILE)
}

/// Effective enabled flag: anything but an explicit `false` is enabled.
pub fn is_enabled(states: &BTreeMap<String, bool>, plugin_id: &str) -> bool {
    states.get(plugin_id).copied().unwrap_or(true)
}

/// Reads and writes enablement overrides.
///
/// Writes for the same project are serialized by an in-process lock; each
/// write re-reads the document and replaces it by renaming a temp file.
#[derive(Debug, Clone, Default)]
pub struct PluginStateManager {
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PluginStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the overrides for a project. Missing or unreadable settings
    /// yield an empty mapping; non-boolean entries are ignored.
    pub async fn get_states(&self, project_root: &Path) -> BTreeMap<String, bool> {
        let path = settings_path(project_root);
        let document = match read_document(&path).await {
            Ok(Some(document)) => document,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Ignoring plugin settings: {}", e);
                return BTreeMap::new();
            }
        };

        document
            .get(ENABLED_PLUGINS_KEY)
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(id, v)| v.as_bool().map(|b| (id.clone(), b)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn set_state(&self, project_root: &Path, plugin_id: &str, enabled: bool) -> Result<()> {
        let path = settings_path(project_root);
        let lock = self.lock_for(&path);
        let _guard = lock.lock().await;

        let mut document = read_document(&path).await?.unwrap_or_default();

        let entries = document
            .entry(ENABLED_PLUGINS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entries.is_object() {
            *entries = Value::Object(Map::new());
        }
        if let Value::Object(entries) = entries {
            entries.insert(plugin_id.to_string(), Value::Bool(enabled));
        }

        write_document(&path, &document).await?;
        tracing::debug!(
            "Set plugin '{}' enabled={} in {}",
            plugin_id,
            enabled,
            path.display()
        );
        Ok(())
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_document(path: &Path) -> Result<Option<Map<String, Value>>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        return Ok(Some(Map::new()));
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(Error::Settings(format!(
            "{} is not a JSON object",
            path.display()
        ))),
        Err(e) => Err(Error::Settings(format!("{}: {}", path.display(), e))),
    }
}

async fn write_document(path: &Path, document: &Map<String, Value>) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::InvalidPath(path.display().to_string()))?;
    tokio::fs::create_dir_all(parent).await?;

    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');

    let temp_path = parent.join(format!("{}.{}.tmp", SETTINGS_FILE, Uuid::new_v4()));
    if let Err(e) = tokio::fs::write(&temp_path, content).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}
