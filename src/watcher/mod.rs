//! File change classification.
//!
//! Each [`WatchTarget`] is a root directory plus ordered glob rules mapping
//! relative paths to a [`ChangeArea`]. Classification is pure; the
//! [`FileWatcher`] (feature `watch`) only feeds it paths from `notify`.

#[cfg(feature = "watch")]
mod fs;

#[cfg(feature = "watch")]
pub use fs::{FileWatcher, change_kind, classify_event};

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::{Error, Result};

/// Path components that are never reported.
pub const IGNORED_COMPONENTS: &[&str] =
    &["node_modules", ".git", ".next", "dist", "build", "coverage"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeArea {
    Docs,
    Claude,
    Plugins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Change,
    Unlink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeEvent {
    pub area: ChangeArea,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
struct WatchRule {
    pattern: Pattern,
    area: ChangeArea,
}

#[derive(Debug, Clone)]
pub struct WatchTarget {
    name: &'static str,
    root: PathBuf,
    rules: Vec<WatchRule>,
}

impl WatchTarget {
    pub fn new(name: &'static str, root: impl Into<PathBuf>) -> Self {
        Self {
            name,
            root: root.into(),
            rules: Vec::new(),
        }
    }

    /// Adds a rule; earlier rules take precedence.
    pub fn rule(mut self, pattern: &str, area: ChangeArea) -> Result<Self> {
        let pattern = Pattern::new(pattern)
            .map_err(|e| Error::Parse(format!("invalid watch pattern '{}': {}", pattern, e)))?;
        self.rules.push(WatchRule { pattern, area });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Area for `path`, or `None` if it is outside the root, ignored, or
    /// matches no rule.
    pub fn classify(&self, path: &Path) -> Option<ChangeArea> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str()?;
                    if IGNORED_COMPONENTS.contains(&part) {
                        return None;
                    }
                    parts.push(part);
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }

        let relative = parts.join("/");
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches_with(&relative, MATCH_OPTIONS))
            .map(|rule| rule.area)
    }
}

/// Targets for a server configuration, in precedence order: docs, global
/// `.claude`, project `.claude`, then `CLAUDE.md` files anywhere in the
/// project.
pub fn watch_targets(config: &ServerConfig) -> Result<Vec<WatchTarget>> {
    use ChangeArea::{Claude, Docs, Plugins};

    Ok(vec![
        WatchTarget::new("docs", &config.docs_path).rule("**/*.md", Docs)?,
        WatchTarget::new("global-claude", config.global_claude_dir())
            .rule("skills/**", Claude)?
            .rule("commands/**", Claude)?
            .rule("agents/**", Claude)?
            .rule("hooks/**", Claude)?
            .rule("CLAUDE.md", Claude)?
            .rule("plugins/**/plugin.json", Plugins)?
            .rule("plugins/**/marketplace.json", Plugins)?,
        WatchTarget::new("project-claude", config.project_claude_dir())
            .rule("plugins/**", Plugins)?
            .rule("settings.json", Plugins)?
            .rule("**", Claude)?,
        WatchTarget::new("project-claude-md", &config.project_root).rule("**/CLAUDE.md", Claude)?,
    ])
}

/// Classifies a change against `targets`; the first matching target wins.
pub fn classify(targets: &[WatchTarget], path: &Path, kind: ChangeKind) -> Option<FileChangeEvent> {
    targets
        .iter()
        .find_map(|target| target.classify(path))
        .map(|area| FileChangeEvent {
            area,
            kind,
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<WatchTarget> {
        watch_targets(&ServerConfig::new("/work/docs", "/work", "/home/dev")).unwrap()
    }

    fn area(path: &str) -> Option<ChangeArea> {
        classify(&targets(), Path::new(path), ChangeKind::Change).map(|e| e.area)
    }

    #[test]
    fn test_docs() {
        assert_eq!(area("/work/docs/guide.md"), Some(ChangeArea::Docs));
        assert_eq!(area("/work/docs/a/b/c.md"), Some(ChangeArea::Docs));
        assert_eq!(area("/work/docs/image.png"), None);
    }

    #[test]
    fn test_global_claude() {
        assert_eq!(area("/home/dev/.claude/skills/a/SKILL.md"), Some(ChangeArea::Claude));
        assert_eq!(area("/home/dev/.claude/hooks/pre.sh"), Some(ChangeArea::Claude));
        assert_eq!(area("/home/dev/.claude/CLAUDE.md"), Some(ChangeArea::Claude));
        assert_eq!(
            area("/home/dev/.claude/plugins/x/.claude-plugin/plugin.json"),
            Some(ChangeArea::Plugins)
        );
        assert_eq!(
            area("/home/dev/.claude/plugins/m/.claude-plugin/marketplace.json"),
            Some(ChangeArea::Plugins)
        );
        assert_eq!(area("/home/dev/.claude/plugins/x/README.md"), None);
        assert_eq!(area("/home/dev/.claude/todos/1.json"), None);
    }

    #[test]
    fn test_project_claude() {
        assert_eq!(area("/work/.claude/settings.json"), Some(ChangeArea::Plugins));
        assert_eq!(area("/work/.claude/plugins/p/x.md"), Some(ChangeArea::Plugins));
        assert_eq!(area("/work/.claude/commands/c.md"), Some(ChangeArea::Claude));
        assert_eq!(area("/work/.claude/CLAUDE.md"), Some(ChangeArea::Claude));
    }

    #[test]
    fn test_project_claude_md_anywhere() {
        assert_eq!(area("/work/src/CLAUDE.md"), Some(ChangeArea::Claude));
        assert_eq!(area("/work/src/main.rs"), None);
    }

    #[test]
    fn test_ignored_components() {
        assert_eq!(area("/work/docs/node_modules/pkg/README.md"), None);
        assert_eq!(area("/work/dist/CLAUDE.md"), None);
        assert_eq!(area("/work/.claude/.git/HEAD"), None);
    }

    #[test]
    fn test_outside_every_root() {
        assert_eq!(area("/tmp/other.md"), None);
        assert_eq!(area("/work/docs"), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = classify(
            &targets(),
            Path::new("/work/docs/a.md"),
            ChangeKind::Unlink,
        )
        .unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["area"], "docs");
        assert_eq!(json["type"], "unlink");
        assert_eq!(json["path"], "/work/docs/a.md");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = WatchTarget::new("bad", "/").rule("[", ChangeArea::Docs).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
