mod directory;
mod frontmatter;
mod source_type;
mod text;

use std::path::PathBuf;

pub use directory::{
    EXCLUDED_DIRS, FileTreeNode, NodeKind, build_tree, is_excluded_dir, is_hidden, is_markdown,
    is_shell_script, list_files,
};
pub(crate) use directory::{
    DirEntryInfo, count_entries, escapes_root, file_stem, join_relative, load_files,
    read_dir_sorted,
};
pub use frontmatter::{
    Frontmatter, ParsedDocument, frontmatter_str, parse_document, parse_frontmatter,
    split_frontmatter,
};
pub use source_type::SourceType;
pub use text::{describe, first_line, first_paragraph_line};

pub(crate) fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|d| d.home_dir().to_path_buf())
}
