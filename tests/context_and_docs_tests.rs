//! Context and Docs Tests
//!
//! CLAUDE.md hierarchy resolution, docs browsing and change classification.
//!
//! Run: cargo nextest run --test context_and_docs_tests

use std::path::Path;

use smart_docs::{
    ChangeArea, ChangeKind, ClaudeMdNode, ContextScope, Error, ServerConfig, Services,
    get_context_tree,
    watcher::{classify, watch_targets},
};
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn context_file(dir: &Path) -> std::path::PathBuf {
    dir.join(".claude").join("CLAUDE.md")
}

// =============================================================================
// CLAUDE.md Context
// =============================================================================

mod context_tests {
    use super::*;

    #[tokio::test]
    async fn test_levels_strictly_increase() {
        let dir = tempdir().unwrap();
        let home = dir.path().join("home");
        let project = dir.path().join("project");
        let docs = project.join("docs");
        write(&context_file(&home), "global");
        write(&context_file(&project), "project");
        write(&context_file(&docs.join("one")), "one");
        write(&context_file(&docs.join("one/two")), "two");

        let nodes = get_context_tree(&home, &project, &docs).await;
        let files: Vec<_> = nodes.iter().flat_map(|n| n.files()).collect();
        let levels: Vec<(ContextScope, usize)> = files.iter().map(|f| (f.scope, f.level)).collect();
        assert_eq!(
            levels,
            vec![
                (ContextScope::Global, 0),
                (ContextScope::Project, 1),
                (ContextScope::Nested, 2),
                (ContextScope::Nested, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_nested_group_shape() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&context_file(&docs.join("guides")), "guides");
        write(&context_file(&docs.join("guides/deep/er")), "deeper");
        write(&context_file(&docs.join("ref")), "ref");

        let nodes = get_context_tree(&dir.path().join("h"), &dir.path().join("p"), &docs).await;
        assert_eq!(nodes.len(), 1);
        let ClaudeMdNode::Directory { name, children, .. } = &nodes[0] else {
            panic!("expected nested group");
        };
        assert_eq!(name, "nested");
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], ClaudeMdNode::Directory { name, .. } if name == "guides"));
        assert_eq!(children[1].as_file().unwrap().name, "ref");

        let json = serde_json::to_value(&nodes).unwrap();
        assert_eq!(json[0]["type"], "directory");
        assert_eq!(json[0]["children"][1]["type"], "file");
    }
}

// =============================================================================
// Docs
// =============================================================================

mod docs_tests {
    use super::*;

    fn services(root: &Path) -> Services {
        Services::new(ServerConfig::new(
            root.join("docs"),
            root.to_path_buf(),
            root.join("home"),
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_browse_docs() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("docs/index.md"), "---\ntitle: Home\n---\nWelcome");
        write(&dir.path().join("docs/how-to/first-steps.md"), "Steps");
        let services = services(dir.path());

        let tree = services.file_tree().await.unwrap();
        let children = tree.children.unwrap();
        assert!(children[0].is_dir());
        assert_eq!(children[0].name, "how-to");

        let files = services.markdown_files().await;
        let titles: Vec<&str> = files.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["First Steps", "Home"]);

        let page = services.read_markdown("index.md").await.unwrap();
        assert_eq!(page.content, "Welcome");
    }

    #[tokio::test]
    async fn test_read_outside_docs_rejected() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("secret.md"), "secret");
        let services = services(dir.path());

        let err = services.read_markdown("../secret.md").await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
        assert!(err.is_configuration_error());
    }

    #[tokio::test]
    async fn test_missing_docs_root() {
        let dir = tempdir().unwrap();
        let services = services(dir.path());
        assert!(services.file_tree().await.unwrap_err().is_not_found());
        assert!(services.markdown_files().await.is_empty());
    }
}

// =============================================================================
// Change Classification
// =============================================================================

mod watcher_tests {
    use super::*;

    #[test]
    fn test_areas_for_server_layout() {
        let config = ServerConfig::new("/srv/project/docs", "/srv/project", "/home/u");
        let targets = watch_targets(&config).unwrap();
        let area = |p: &str| classify(&targets, Path::new(p), ChangeKind::Add).map(|e| e.area);

        assert_eq!(area("/srv/project/docs/intro.md"), Some(ChangeArea::Docs));
        assert_eq!(area("/home/u/.claude/agents/a.md"), Some(ChangeArea::Claude));
        assert_eq!(
            area("/srv/project/.claude/settings.json"),
            Some(ChangeArea::Plugins)
        );
        assert_eq!(area("/srv/project/lib/CLAUDE.md"), Some(ChangeArea::Claude));
        assert_eq!(area("/srv/project/coverage/CLAUDE.md"), None);
    }
}
