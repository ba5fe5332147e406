//! Plugin discovery and per-project enablement.
//!
//! A standalone plugin is a directory with a `.claude-plugin/plugin.json`
//! manifest. A marketplace is a directory with `.claude-plugin/marketplace.json`
//! declaring several plugins inline; each entry is identified as
//! `name@marketplace`.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.claude/plugins/
//! ├── my-plugin/
//! │   ├── .claude-plugin/
//! │   │   └── plugin.json
//! │   ├── skills/
//! │   │   └── commit/
//! │   │       └── SKILL.md
//! │   ├── commands/
//! │   │   └── hello.md
//! │   ├── agents/
//! │   │   └── reviewer.md
//! │   └── hooks/
//! │       └── pre-commit.sh
//! └── marketplaces/
//!     └── acme/
//!         ├── .claude-plugin/
//!         │   └── marketplace.json
//!         └── skills/
//!             └── pdf/
//! ```
//!
//! Discovery looks at most [`DEFAULT_MAX_DEPTH`] levels below `plugins/`.

mod discovery;
mod error;
pub mod id;
mod lenient;
mod manifest;
mod marketplace;
mod state;

pub use discovery::{
    ComponentCounts, DEFAULT_MAX_DEPTH, DirectoryKind, PLUGINS_DIR, Plugin, PluginDiscovery,
    PluginRoot, classify, dedupe_plugins, plugin_roots, should_descend,
};
pub use error::PluginError;
pub use manifest::{PluginAuthor, PluginManifest, Repository};
pub use marketplace::{
    MarketplaceManifest, MarketplaceMetadata, MarketplaceOwner, MarketplacePlugin,
    MarketplacePluginSource, get_marketplace_manifest,
};
pub use state::{
    ENABLED_PLUGINS_KEY, PluginStateManager, SETTINGS_FILE, is_enabled, settings_path,
};

/// Discovers plugins under every root with the default depth bound.
pub async fn discover_plugins(roots: &[PluginRoot]) -> Vec<Plugin> {
    PluginDiscovery::new().discover(roots).await
}
