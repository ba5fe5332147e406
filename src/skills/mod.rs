//! Skills: directory-based artifacts bundling files plus optional metadata.
//!
//! ```text
//! <base>/skills/
//! └── commit/
//!     ├── SKILL.md        # metadata source (frontmatter name/description/tags)
//!     └── scripts/
//!         └── check.sh
//! ```

mod loader;

pub use loader::{METADATA_FILES, SKILLS_DIR, SkillLoader};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Frontmatter, SourceType, first_paragraph_line, frontmatter_str};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl SkillMetadata {
    /// Builds metadata from a parsed metadata file.
    ///
    /// `name` falls back to `dir_name`; `description` falls back to the first
    /// non-heading line of the body.
    pub fn from_document(frontmatter: &Frontmatter, body: &str, dir_name: &str) -> Self {
        let name = frontmatter_str(frontmatter, "name")
            .unwrap_or(dir_name)
            .to_string();
        let description = frontmatter_str(frontmatter, "description")
            .or_else(|| first_paragraph_line(body))
            .map(str::to_string);
        let tags = frontmatter.get("tags").and_then(parse_tags);

        Self {
            name,
            description,
            tags,
        }
    }
}

fn parse_tags(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    pub path: PathBuf,
    pub source: SourceType,
    pub metadata: Option<SkillMetadata>,
    /// Paths relative to the skill directory, `/`-separated.
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_contents: Option<BTreeMap<String, String>>,
}

impl Skill {
    pub fn has_contents(&self) -> bool {
        self.file_contents.is_some()
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.as_ref()?.description.as_deref()
    }
}
