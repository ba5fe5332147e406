//! Markdown documentation under the docs root.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::common::{
    FileTreeNode, Frontmatter, build_tree, escapes_root, frontmatter_str, is_hidden, is_markdown,
    join_relative, parse_document, read_dir_sorted,
};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownFile {
    /// Relative to the docs root, `/`-separated.
    pub path: String,
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownContent {
    pub path: String,
    pub frontmatter: Option<Frontmatter>,
    /// Body with frontmatter stripped.
    pub content: String,
}

pub async fn file_tree(docs_root: &Path) -> Result<FileTreeNode> {
    build_tree(docs_root).await
}

/// Every `*.md` file below `docs_root`, skipping dotfiles and `node_modules`.
pub async fn list_markdown_files(docs_root: &Path) -> Vec<MarkdownFile> {
    let mut files = Vec::new();
    scan_markdown(docs_root.to_path_buf(), String::new(), &mut files).await;
    files
}

fn scan_markdown<'a>(
    dir: PathBuf,
    prefix: String,
    files: &'a mut Vec<MarkdownFile>,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        let Ok(entries) = read_dir_sorted(&dir, false).await else {
            return;
        };

        for entry in entries {
            if is_hidden(&entry.name) || entry.name == "node_modules" {
                continue;
            }
            let relative = join_relative(&prefix, &entry.name);

            if entry.is_dir {
                scan_markdown(entry.path, relative, files).await;
            } else if entry.is_file && is_markdown(&entry.path) {
                let title = match tokio::fs::read_to_string(&entry.path).await {
                    Ok(raw) => frontmatter_str(&parse_document(&raw).frontmatter, "title")
                        .map(str::to_string),
                    Err(e) => {
                        tracing::warn!("Failed to read {}: {}", entry.path.display(), e);
                        continue;
                    }
                };
                files.push(MarkdownFile {
                    title: title.unwrap_or_else(|| title_from_filename(&entry.name)),
                    path: relative,
                    name: entry.name,
                });
            }
        }
    })
}

/// Reads one markdown file given its path relative to `docs_root`.
pub async fn read_markdown(docs_root: &Path, relative: &str) -> Result<MarkdownContent> {
    let rel_path = Path::new(relative);
    if relative.is_empty() || escapes_root(rel_path) {
        return Err(Error::InvalidPath(relative.to_string()));
    }

    let raw = tokio::fs::read_to_string(docs_root.join(rel_path)).await?;
    let doc = parse_document(&raw);
    Ok(MarkdownContent {
        path: relative.to_string(),
        frontmatter: (!doc.frontmatter.is_empty()).then_some(doc.frontmatter),
        content: doc.body,
    })
}

/// `getting-started.md` → `Getting Started`.
pub fn title_from_filename(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let mut title = String::with_capacity(stem.len());
    let mut prev_is_word = false;

    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let is_word = c.is_alphanumeric();
        if is_word && !prev_is_word {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        prev_is_word = is_word;
    }

    title
}
