//! Skill loader - discovers skill directories and their metadata files.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Component, Path};

use super::{Skill, SkillMetadata};
use crate::common::{SourceType, escapes_root, list_files, parse_document, read_dir_sorted};

/// Metadata file names probed in order; the first readable one wins.
pub const METADATA_FILES: &[&str] = &["skill.md", "SKILL.md", "README.md", "readme.md"];

pub const SKILLS_DIR: &str = "skills";

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillLoader;

impl SkillLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads every immediate subdirectory of `<base>/skills` as a skill.
    pub async fn load(&self, base: &Path, source: SourceType, include_contents: bool) -> Vec<Skill> {
        let skills_dir = base.join(SKILLS_DIR);
        let entries = match read_dir_sorted(&skills_dir, true).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read skills directory {}: {}", skills_dir.display(), e);
                }
                return Vec::new();
            }
        };

        let mut skills = Vec::new();
        for entry in entries.into_iter().filter(|e| e.is_dir) {
            skills.push(
                self.load_skill(&entry.path, entry.name, source, include_contents)
                    .await,
            );
        }
        skills
    }

    /// Loads the skill directories a marketplace entry declares, relative to `root`.
    ///
    /// Paths that are absolute, escape `root`, or do not name a directory are
    /// skipped with a warning.
    pub async fn load_paths(
        &self,
        root: &Path,
        relative_paths: &[String],
        include_contents: bool,
    ) -> Vec<Skill> {
        let mut skills = Vec::new();

        for relative in relative_paths {
            let rel_path = Path::new(relative);
            if escapes_root(rel_path) {
                tracing::warn!("Skipping skill path outside marketplace: {}", relative);
                continue;
            }

            let full_path = root.join(rel_path);
            match tokio::fs::metadata(&full_path).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    tracing::warn!("Skill path is not a directory: {}", full_path.display());
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Failed to load skill {}: {}", relative, e);
                    continue;
                }
            }

            let name = declared_skill_name(root, rel_path);
            skills.push(
                self.load_skill(&full_path, name, SourceType::Plugin, include_contents)
                    .await,
            );
        }

        skills
    }

    pub async fn load_skill(
        &self,
        dir: &Path,
        name: String,
        source: SourceType,
        include_contents: bool,
    ) -> Skill {
        let (metadata, files) = tokio::join!(Self::read_metadata(dir, &name), list_files(dir));

        let file_contents = if include_contents {
            Some(Self::read_file_contents(dir, &files).await)
        } else {
            None
        };

        Skill {
            name,
            path: dir.to_path_buf(),
            source,
            metadata,
            files,
            file_contents,
        }
    }

    /// Fills `file_contents` if it has not been read yet.
    pub async fn populate_contents(&self, skill: &mut Skill) {
        if skill.file_contents.is_none() {
            skill.file_contents = Some(Self::read_file_contents(&skill.path, &skill.files).await);
        }
    }

    /// Reads each file as UTF-8 text. Unreadable or binary files are omitted.
    pub async fn read_file_contents(dir: &Path, files: &[String]) -> BTreeMap<String, String> {
        let mut contents = BTreeMap::new();
        for file in files {
            match tokio::fs::read_to_string(dir.join(file)).await {
                Ok(text) => {
                    contents.insert(file.clone(), text);
                }
                Err(e) => tracing::debug!("Omitting {} from skill contents: {}", file, e),
            }
        }
        contents
    }

    /// Probes [`METADATA_FILES`] in order, then retries the same names
    /// case-insensitively. Returns `None` when no metadata file is readable.
    pub async fn read_metadata(dir: &Path, dir_name: &str) -> Option<SkillMetadata> {
        for file_name in METADATA_FILES {
            if let Ok(content) = tokio::fs::read_to_string(dir.join(file_name)).await {
                return Some(Self::parse_metadata(&content, dir_name));
            }
        }

        let entries = read_dir_sorted(dir, true).await.ok()?;
        for file_name in METADATA_FILES {
            let found = entries
                .iter()
                .find(|e| e.is_file && e.name.eq_ignore_ascii_case(file_name));
            if let Some(entry) = found
                && let Ok(content) = tokio::fs::read_to_string(&entry.path).await
            {
                return Some(Self::parse_metadata(&content, dir_name));
            }
        }

        None
    }

    fn parse_metadata(content: &str, dir_name: &str) -> SkillMetadata {
        let doc = parse_document(content);
        SkillMetadata::from_document(&doc.frontmatter, &doc.body, dir_name)
    }
}

/// Last directory named by a root-relative path, or the root's own name when
/// the path resolves to the root itself (`.`, `./`, `a/..`).
fn declared_skill_name(root: &Path, relative: &Path) -> String {
    let mut parts: Vec<&OsStr> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }
    parts
        .last()
        .copied()
        .or_else(|| root.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}
