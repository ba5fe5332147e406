use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{
    SourceType, describe, file_stem, frontmatter_str, is_markdown, load_files, parse_document,
};

pub const COMMANDS_DIR: &str = "commands";
pub const AGENTS_DIR: &str = "agents";

/// A markdown file with optional frontmatter, loaded as a command or agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownArtifact {
    pub name: String,
    pub path: PathBuf,
    pub source: SourceType,
    /// Body with frontmatter stripped.
    pub content: String,
    pub description: String,
}

pub type Command = MarkdownArtifact;
pub type Agent = MarkdownArtifact;

impl MarkdownArtifact {
    pub fn parse(path: &Path, raw: &str, source: SourceType) -> Self {
        let doc = parse_document(raw);
        let description = describe(frontmatter_str(&doc.frontmatter, "description"), &doc.body);
        Self {
            name: file_stem(path),
            path: path.to_path_buf(),
            source,
            content: doc.body,
            description,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MarkdownArtifactLoader {
    dir_name: &'static str,
}

impl MarkdownArtifactLoader {
    pub fn commands() -> Self {
        Self {
            dir_name: COMMANDS_DIR,
        }
    }

    pub fn agents() -> Self {
        Self {
            dir_name: AGENTS_DIR,
        }
    }

    pub fn dir_name(&self) -> &'static str {
        self.dir_name
    }

    /// Loads `<base>/<dir>/*.md`. A missing directory yields an empty list;
    /// a file that cannot be read is skipped.
    pub async fn load(&self, base: &Path, source: SourceType) -> Vec<MarkdownArtifact> {
        load_files(&base.join(self.dir_name), is_markdown, |path| async move {
            let raw = tokio::fs::read_to_string(&path).await?;
            Ok::<_, crate::Error>(MarkdownArtifact::parse(&path, &raw, source))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[test]
    fn test_description_from_frontmatter() {
        let cmd = MarkdownArtifact::parse(
            Path::new("/c/review.md"),
            "---\ndescription: Review a PR\n---\n# Review\nSteps",
            SourceType::Global,
        );
        assert_eq!(cmd.name, "review");
        assert_eq!(cmd.description, "Review a PR");
        assert_eq!(cmd.content, "# Review\nSteps");
    }

    #[test]
    fn test_description_skips_heading() {
        let cmd = MarkdownArtifact::parse(
            Path::new("deploy.md"),
            "# Title\nDoes a thing.",
            SourceType::Project,
        );
        assert_eq!(cmd.description, "Does a thing.");
        assert_eq!(cmd.content, "# Title\nDoes a thing.");
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let commands = MarkdownArtifactLoader::commands()
            .load(dir.path(), SourceType::Global)
            .await;
        assert!(commands.is_empty());
    }

    #[tokio::test]
    async fn test_load_agents_non_recursive() {
        let dir = tempdir().unwrap();
        let agents_dir = dir.path().join("agents");
        fs::create_dir_all(agents_dir.join("nested")).await.unwrap();
        fs::write(agents_dir.join("tester.md"), "Runs tests")
            .await
            .unwrap();
        fs::write(agents_dir.join("notes.txt"), "ignored")
            .await
            .unwrap();
        fs::write(agents_dir.join("nested/deep.md"), "ignored")
            .await
            .unwrap();

        let agents = MarkdownArtifactLoader::agents()
            .load(dir.path(), SourceType::Plugin)
            .await;
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "tester");
        assert_eq!(agents[0].description, "Runs tests");
        assert_eq!(agents[0].source, SourceType::Plugin);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_skipped() {
        let dir = tempdir().unwrap();
        let commands_dir = dir.path().join("commands");
        fs::create_dir_all(&commands_dir).await.unwrap();
        fs::write(commands_dir.join("good.md"), "Good").await.unwrap();
        fs::write(commands_dir.join("bad.md"), [0xff, 0xfe]).await.unwrap();

        let commands = MarkdownArtifactLoader::commands()
            .load(dir.path(), SourceType::Global)
            .await;
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].name, "good");
    }
}
