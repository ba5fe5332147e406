use std::cmp::Ordering;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Directory names never descended into while walking.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git"];

#[derive(Debug, Clone)]
pub(crate) struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_file: bool,
}

/// Reads a directory and returns its entries sorted by name.
///
/// With `follow_symlinks` the entry type is that of the link target. Without
/// it, symlinks to files count as files and symlinks to directories are
/// reported as neither, so unbounded walks can never loop.
pub(crate) async fn read_dir_sorted(
    dir: &Path,
    follow_symlinks: bool,
) -> std::io::Result<Vec<DirEntryInfo>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut items = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Ok(file_type) = entry.file_type().await else {
            continue;
        };

        let (is_dir, is_file) = if file_type.is_symlink() {
            match tokio::fs::metadata(&path).await {
                Ok(target) if follow_symlinks => (target.is_dir(), target.is_file()),
                Ok(target) => (false, target.is_file()),
                // dangling link
                Err(_) => continue,
            }
        } else {
            (file_type.is_dir(), file_type.is_file())
        };

        items.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
            is_file,
        });
    }

    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
}

/// Loads every entry of `dir` accepted by `filter`.
///
/// A missing or unreadable directory yields an empty list. Entries whose
/// loader fails are logged and skipped.
pub(crate) async fn load_files<T, F, Fut>(
    dir: &Path,
    filter: impl Fn(&Path) -> bool,
    loader: F,
) -> Vec<T>
where
    F: Fn(PathBuf) -> Fut,
    Fut: Future<Output = crate::Result<T>>,
{
    let mut items = Vec::new();

    let entries = match read_dir_sorted(dir, true).await {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
            }
            return items;
        }
    };

    for entry in entries {
        if !entry.is_file || !filter(&entry.path) {
            continue;
        }
        match loader(entry.path.clone()).await {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!("Failed to load {}: {}", entry.path.display(), e),
        }
    }

    items
}

/// Counts entries of `dir` accepted by `filter`; a missing directory counts zero.
pub(crate) async fn count_entries(dir: &Path, filter: impl Fn(&DirEntryInfo) -> bool) -> usize {
    read_dir_sorted(dir, true)
        .await
        .map(|entries| entries.iter().filter(|e| filter(e)).count())
        .unwrap_or(0)
}

/// Lists every file below `root` as a `/`-joined path relative to `root`.
///
/// Returns an empty list when `root` does not exist or cannot be read.
pub async fn list_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    collect_files(root.to_path_buf(), String::new(), &mut files).await;
    files
}

fn collect_files<'a>(
    dir: PathBuf,
    prefix: String,
    files: &'a mut Vec<String>,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        let Ok(entries) = read_dir_sorted(&dir, false).await else {
            return;
        };

        for entry in entries {
            let relative = join_relative(&prefix, &entry.name);
            if entry.is_file {
                files.push(relative);
            } else if entry.is_dir && !is_excluded_dir(&entry.name) {
                collect_files(entry.path, relative, files).await;
            }
        }
    })
}

pub(crate) fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    /// Path relative to the tree root; empty for the root itself.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

impl FileTreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Builds a tree of `root`, skipping dotfiles and `node_modules`.
///
/// Children are ordered directories first, then by name.
pub async fn build_tree(root: &Path) -> crate::Result<FileTreeNode> {
    let metadata = tokio::fs::metadata(root).await?;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if metadata.is_file() {
        return Ok(FileTreeNode {
            kind: NodeKind::File,
            name,
            path: String::new(),
            children: None,
        });
    }

    let children = tree_children(root.to_path_buf(), String::new()).await;
    Ok(FileTreeNode {
        kind: NodeKind::Directory,
        name,
        path: String::new(),
        children: Some(children),
    })
}

fn tree_children(
    dir: PathBuf,
    prefix: String,
) -> Pin<Box<dyn Future<Output = Vec<FileTreeNode>> + Send>> {
    Box::pin(async move {
        let entries = match read_dir_sorted(&dir, false).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping unreadable directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut nodes = Vec::new();
        for entry in entries {
            if is_hidden(&entry.name) || entry.name == "node_modules" {
                continue;
            }
            let relative = join_relative(&prefix, &entry.name);
            if entry.is_dir {
                let children = tree_children(entry.path, relative.clone()).await;
                nodes.push(FileTreeNode {
                    kind: NodeKind::Directory,
                    name: entry.name,
                    path: relative,
                    children: Some(children),
                });
            } else if entry.is_file {
                nodes.push(FileTreeNode {
                    kind: NodeKind::File,
                    name: entry.name,
                    path: relative,
                    children: None,
                });
            }
        }

        nodes.sort_by(compare_nodes);
        nodes
    })
}

fn compare_nodes(a: &FileTreeNode, b: &FileTreeNode) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "md")
}

pub fn is_shell_script(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "sh")
}

/// Whether a relative path is absolute or climbs above its base.
pub(crate) fn escapes_root(path: &Path) -> bool {
    let mut depth: i32 = 0;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return true,
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
        }
    }
    false
}

/// File name without its final extension.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
