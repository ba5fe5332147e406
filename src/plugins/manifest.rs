use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{PluginError, id, lenient};

pub(crate) const PLUGIN_CONFIG_DIR: &str = ".claude-plugin";
pub(crate) const PLUGIN_MANIFEST_FILE: &str = "plugin.json";

/// Author as either a bare name or a structured record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginAuthor {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl PluginAuthor {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name, .. } => name,
        }
    }
}

/// Repository as a bare URL or an npm-style `{ "type", "url" }` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Repository {
    Url(String),
    Detailed {
        url: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
}

impl Repository {
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Detailed { url, .. } => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Self::Url(url) | Self::Detailed { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<PluginAuthor>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub repository: Option<Repository>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub homepage: Option<String>,
}

impl PluginManifest {
    pub fn path_in(root_dir: &Path) -> PathBuf {
        root_dir.join(PLUGIN_CONFIG_DIR).join(PLUGIN_MANIFEST_FILE)
    }

    /// Loads and validates `<root_dir>/.claude-plugin/plugin.json`.
    pub async fn load(root_dir: &Path) -> Result<Self, PluginError> {
        let manifest_path = Self::path_in(root_dir);
        let content = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PluginError::ManifestNotFound {
                    path: manifest_path,
                });
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&content, manifest_path)
    }

    pub fn parse(content: &str, manifest_path: PathBuf) -> Result<Self, PluginError> {
        let manifest: Self =
            serde_json::from_str(content).map_err(|e| PluginError::InvalidManifest {
                path: manifest_path.clone(),
                reason: e.to_string(),
            })?;
        id::validate_name(&manifest.name).map_err(|e| PluginError::InvalidManifest {
            path: manifest_path,
            reason: e.to_string(),
        })?;
        Ok(manifest)
    }

    /// Name shown to users: `displayName` when set, else `name`.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.name)
    }
}
