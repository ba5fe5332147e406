//! CLAUDE.md context resolution.
//!
//! Context files live at `<dir>/.claude/CLAUDE.md`. The resolved tree has up
//! to three top-level groups:
//!
//! | Group   | Location                                | Level |
//! |---------|-----------------------------------------|-------|
//! | global  | `<home>/.claude/CLAUDE.md`              | 0     |
//! | project | `<project>/.claude/CLAUDE.md`           | 1     |
//! | nested  | any directory below the docs root       | 2+    |
//!
//! Nested levels grow by one per directory below the docs root.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::common::{Frontmatter, is_excluded_dir, is_hidden, parse_document, read_dir_sorted};

pub const CLAUDE_DIR: &str = ".claude";
pub const CLAUDE_MD: &str = "CLAUDE.md";

const GLOBAL_LEVEL: usize = 0;
const PROJECT_LEVEL: usize = 1;
const NESTED_GROUP: &str = "nested";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextScope {
    Global,
    Project,
    Nested,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaudeMdFile {
    pub name: String,
    pub path: PathBuf,
    pub scope: ContextScope,
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClaudeMdNode {
    Directory {
        name: String,
        path: PathBuf,
        children: Vec<ClaudeMdNode>,
    },
    File(ClaudeMdFile),
}

impl ClaudeMdNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } => name,
            Self::File(file) => &file.name,
        }
    }

    pub fn as_file(&self) -> Option<&ClaudeMdFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory { .. } => None,
        }
    }

    /// All file nodes in depth-first order.
    pub fn files(&self) -> Vec<&ClaudeMdFile> {
        match self {
            Self::File(file) => vec![file],
            Self::Directory { children, .. } => children.iter().flat_map(|c| c.files()).collect(),
        }
    }
}

pub fn context_file_path(dir: &Path) -> PathBuf {
    dir.join(CLAUDE_DIR).join(CLAUDE_MD)
}

/// Builds the context tree for a home directory, project and docs root.
/// Unreadable files and directories are skipped.
pub async fn get_context_tree(
    home_dir: &Path,
    project_root: &Path,
    docs_root: &Path,
) -> Vec<ClaudeMdNode> {
    let global_path = context_file_path(home_dir);
    let project_path = context_file_path(project_root);
    let mut nodes = Vec::new();

    if let Some(file) =
        read_context_file(&global_path, "Global".into(), ContextScope::Global, GLOBAL_LEVEL).await
    {
        nodes.push(ClaudeMdNode::File(file));
    }
    if let Some(file) =
        read_context_file(&project_path, "Project".into(), ContextScope::Project, PROJECT_LEVEL)
            .await
    {
        nodes.push(ClaudeMdNode::File(file));
    }

    let known = vec![canonical(&global_path).await, canonical(&project_path).await];
    let nested = scan_nested(docs_root.to_path_buf(), 1, &known).await;
    if !nested.is_empty() {
        nodes.push(ClaudeMdNode::Directory {
            name: NESTED_GROUP.into(),
            path: docs_root.to_path_buf(),
            children: nested,
        });
    }

    nodes
}

fn scan_nested<'a>(
    dir: PathBuf,
    depth: usize,
    known: &'a [PathBuf],
) -> Pin<Box<dyn Future<Output = Vec<ClaudeMdNode>> + Send + 'a>> {
    Box::pin(async move {
        let mut nodes = Vec::new();
        let Ok(entries) = read_dir_sorted(&dir, false).await else {
            return nodes;
        };

        for entry in entries {
            if !entry.is_dir || is_hidden(&entry.name) || is_excluded_dir(&entry.name) {
                continue;
            }

            let own_path = context_file_path(&entry.path);
            let own = if known.contains(&canonical(&own_path).await) {
                None
            } else {
                read_context_file(&own_path, entry.name.clone(), ContextScope::Nested, depth + 1)
                    .await
            };
            let descendants = scan_nested(entry.path.clone(), depth + 1, known).await;

            match own {
                Some(file) if descendants.is_empty() => nodes.push(ClaudeMdNode::File(file)),
                Some(file) => {
                    let mut children = vec![ClaudeMdNode::File(file)];
                    children.extend(descendants);
                    nodes.push(ClaudeMdNode::Directory {
                        name: entry.name,
                        path: entry.path,
                        children,
                    });
                }
                None => nodes.extend(descendants),
            }
        }

        nodes
    })
}

async fn read_context_file(
    path: &Path,
    name: String,
    scope: ContextScope,
    level: usize,
) -> Option<ClaudeMdFile> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
            }
            return None;
        }
    };

    let doc = parse_document(&content);
    Some(ClaudeMdFile {
        name,
        path: path.to_path_buf(),
        scope,
        level,
        frontmatter: (!doc.frontmatter.is_empty()).then_some(doc.frontmatter),
        content,
    })
}

async fn canonical(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}
