//! Marketplace manifests: one `.claude-plugin/marketplace.json` declaring
//! several plugins inline.
//!
//! ```json
//! {
//!   "name": "acme",
//!   "owner": { "name": "Acme" },
//!   "metadata": { "description": "Acme tools", "version": "1.2.0" },
//!   "plugins": [
//!     { "name": "tools", "source": "./", "skills": ["./skills/pdf"] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::manifest::{PLUGIN_CONFIG_DIR, Repository};
use super::{PluginError, id, lenient};

pub(crate) const MARKETPLACE_MANIFEST_FILE: &str = "marketplace.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceOwner {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Where a marketplace entry's files live: a path relative to the
/// marketplace, or a structured remote source kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarketplacePluginSource {
    Path(String),
    Remote(serde_json::Value),
}

impl MarketplacePluginSource {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Path(p) if p.starts_with("http://") || p.starts_with("https://") => {
                Some(p.as_str())
            }
            Self::Path(_) => None,
            Self::Remote(value) => value.get("url").and_then(|u| u.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplacePlugin {
    pub name: String,
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
    pub source: Option<MarketplacePluginSource>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub strict: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub homepage: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub repository: Option<Repository>,
    #[serde(default, deserialize_with = "lenient::path_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::path_list")]
    pub commands: Vec<String>,
    #[serde(default, deserialize_with = "lenient::path_list")]
    pub agents: Vec<String>,
    #[serde(default, deserialize_with = "lenient::path_list")]
    pub hooks: Vec<String>,
}

impl MarketplacePlugin {
    pub fn url(&self) -> Option<&str> {
        self.repository
            .as_ref()
            .map(Repository::url)
            .or(self.homepage.as_deref())
            .or_else(|| self.source.as_ref().and_then(|s| s.url()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceManifest {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner: Option<MarketplaceOwner>,
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<MarketplaceMetadata>,
    #[serde(default, deserialize_with = "lenient::each")]
    pub plugins: Vec<MarketplacePlugin>,
}

impl MarketplaceManifest {
    pub fn path_in(root_dir: &Path) -> PathBuf {
        root_dir
            .join(PLUGIN_CONFIG_DIR)
            .join(MARKETPLACE_MANIFEST_FILE)
    }

    /// Loads and validates `<root_dir>/.claude-plugin/marketplace.json`.
    ///
    /// Entries whose names cannot form a valid id are dropped with a warning;
    /// the marketplace itself must have a valid name.
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
        let mut manifest: Self =
            serde_json::from_str(content).map_err(|e| PluginError::InvalidManifest {
                path: manifest_path.clone(),
                reason: e.to_string(),
            })?;

        id::validate_name(&manifest.name).map_err(|e| PluginError::InvalidManifest {
            path: manifest_path.clone(),
            reason: format!("marketplace {}", e),
        })?;

        manifest.plugins.retain(|plugin| match id::validate_name(&plugin.name) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Skipping entry in {}: {}", manifest_path.display(), e);
                false
            }
        });

        Ok(manifest)
    }

    pub fn plugin(&self, name: &str) -> Option<&MarketplacePlugin> {
        self.plugins.iter().find(|p| p.name == name)
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.as_ref()?.description.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.metadata.as_ref()?.version.as_deref()
    }
}

/// Reads a marketplace manifest, returning `None` when it is missing or invalid.
pub async fn get_marketplace_manifest(root_dir: &Path) -> Option<MarketplaceManifest> {
    match MarketplaceManifest::load(root_dir).await {
        Ok(manifest) => Some(manifest),
        Err(PluginError::ManifestNotFound { .. }) => None,
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ACME: &str = r#"{
        "name": "acme",
        "owner": {"name": "Acme", "email": "dev@acme.test"},
        "metadata": {"description": "Acme tools", "version": "1.2.0"},
        "plugins": [
            {"name": "tools", "source": "./", "skills": ["./skills/pdf", "./skills/xlsx"], "commands": ["./commands/a.md"]},
            {"name": "docs", "source": {"source": "github", "url": "https://github.com/acme/docs"}},
            {"name": "bad@entry"}
        ]
    }"#;

    #[test]
    fn test_parse_marketplace() {
        let manifest = MarketplaceManifest::parse(ACME, PathBuf::from("m.json")).unwrap();
        assert_eq!(manifest.name, "acme");
        assert_eq!(manifest.owner.as_ref().unwrap().name, "Acme");
        assert_eq!(manifest.description(), Some("Acme tools"));
        assert_eq!(manifest.version(), Some("1.2.0"));
        // invalid entry dropped
        assert_eq!(manifest.plugins.len(), 2);

        let tools = manifest.plugin("tools").unwrap();
        assert_eq!(tools.skills.len(), 2);
        assert_eq!(tools.commands.len(), 1);
        assert!(tools.agents.is_empty());
        assert_eq!(tools.url(), None);

        let docs = manifest.plugin("docs").unwrap();
        assert_eq!(docs.url(), Some("https://github.com/acme/docs"));
    }

    #[test]
    fn test_malformed_entry_fields_tolerated() {
        let manifest = MarketplaceManifest::parse(
            r#"{
                "name": "acme",
                "owner": "Acme Inc",
                "plugins": [
                    {"name": "good", "skills": ["./skills/pdf"]},
                    {"name": "odd", "hooks": "./hooks/hooks.json", "repository": {"type": "git", "url": "https://x"}},
                    {"name": "weird", "skills": {"pdf": true}, "strict": "yes"},
                    {"description": "no name"},
                    "not an object"
                ]
            }"#,
            PathBuf::from("m.json"),
        )
        .unwrap();

        assert!(manifest.owner.is_none());
        let names: Vec<&str> = manifest.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["good", "odd", "weird"]);

        let odd = manifest.plugin("odd").unwrap();
        assert_eq!(odd.hooks, vec!["./hooks/hooks.json"]);
        assert_eq!(odd.url(), Some("https://x"));

        let weird = manifest.plugin("weird").unwrap();
        assert!(weird.skills.is_empty());
        assert!(weird.strict.is_none());
    }

    #[test]
    fn test_missing_marketplace_name_rejected() {
        let err = MarketplaceManifest::parse(r#"{"plugins": []}"#, PathBuf::from("m.json"))
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidManifest { .. }));
    }

    #[test]
    fn test_empty_marketplace_name_rejected() {
        let err = MarketplaceManifest::parse(r#"{"name": ""}"#, PathBuf::from("m.json"))
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidManifest { .. }));
    }

    #[tokio::test]
    async fn test_get_marketplace_manifest() {
        let dir = tempdir().unwrap();
        assert!(get_marketplace_manifest(dir.path()).await.is_none());

        let config_dir = dir.path().join(PLUGIN_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(MARKETPLACE_MANIFEST_FILE), "{broken").unwrap();
        assert!(get_marketplace_manifest(dir.path()).await.is_none());

        std::fs::write(config_dir.join(MARKETPLACE_MANIFEST_FILE), ACME).unwrap();
        let manifest = get_marketplace_manifest(dir.path()).await.unwrap();
        assert_eq!(manifest.name, "acme");
    }
}
