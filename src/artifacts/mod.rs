//! Single-file artifacts: commands and agents (markdown) and hooks (shell).
//!
//! ```text
//! <base>/
//! ├── commands/review.md   → Command "review"
//! ├── agents/tester.md     → Agent "tester"
//! └── hooks/pre-commit.sh  → Hook "pre-commit"
//! ```
//!
//! Only files directly inside each directory are considered.

mod hooks;
mod markdown;

pub use hooks::{HOOKS_DIR, Hook, HookLoader};
pub use markdown::{
    AGENTS_DIR, Agent, COMMANDS_DIR, Command, MarkdownArtifact, MarkdownArtifactLoader,
};
