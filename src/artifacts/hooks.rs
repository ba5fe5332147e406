use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{SourceType, file_stem, is_shell_script, load_files};

pub const HOOKS_DIR: &str = "hooks";

/// A shell script hook. Content is kept raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub name: String,
    pub path: PathBuf,
    pub source: SourceType,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HookLoader;

impl HookLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads `<base>/hooks/*.sh`.
    pub async fn load(&self, base: &Path, source: SourceType) -> Vec<Hook> {
        load_files(&base.join(HOOKS_DIR), is_shell_script, |path| async move {
            let content = tokio::fs::read_to_string(&path).await?;
            Ok::<_, crate::Error>(Hook {
                name: file_stem(&path),
                path,
                source,
                content,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_load_hooks() {
        let dir = tempdir().unwrap();
        let hooks_dir = dir.path().join("hooks");
        fs::create_dir_all(&hooks_dir).await.unwrap();
        fs::write(hooks_dir.join("pre-commit.sh"), "#!/bin/sh\n---\necho hi\n")
            .await
            .unwrap();
        fs::write(hooks_dir.join("hooks.json"), "{}").await.unwrap();

        let hooks = HookLoader::new().load(dir.path(), SourceType::Global).await;
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].name, "pre-commit");
        assert_eq!(hooks[0].content, "#!/bin/sh\n---\necho hi\n");
    }

    #[tokio::test]
    async fn test_missing_hooks_dir() {
        let dir = tempdir().unwrap();
        assert!(
            HookLoader::new()
                .load(dir.path(), SourceType::Project)
                .await
                .is_empty()
        );
    }
}
