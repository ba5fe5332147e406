//! Lenient YAML frontmatter parsing.
//!
//! A document carries frontmatter when its first line is exactly `---` and a
//! later line closes the block with `---` (or `...`). Anything else, including
//! an unterminated block or YAML that fails to parse, is treated as a document
//! without frontmatter: the metadata is empty and the body is the full input.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const DELIMITER: &str = "---";
const CLOSING_ALT: &str = "...";

/// Key/value metadata parsed from a frontmatter block.
pub type Frontmatter = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument<F> {
    pub frontmatter: F,
    pub body: String,
}

/// Splits `content` into the raw frontmatter block and the body.
///
/// Returns `None` when the document has no well-formed frontmatter block.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let (first, rest) = split_line(content)?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let mut offset = 0;
    let mut remaining = rest;
    while !remaining.is_empty() {
        let (line, next) = split_line(remaining).unwrap_or((remaining, ""));
        let trimmed = line.trim_end();
        if trimmed == DELIMITER || trimmed == CLOSING_ALT {
            return Some((&rest[..offset], next));
        }
        offset += remaining.len() - next.len();
        remaining = next;
    }

    None
}

fn split_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    match s.find('\n') {
        Some(pos) => Some((&s[..pos], &s[pos + 1..])),
        None => Some((s, "")),
    }
}

/// Parses frontmatter into `F`, falling back to `F::default()` and the whole
/// input as body whenever the block is absent or malformed.
pub fn parse_frontmatter<F>(content: &str) -> ParsedDocument<F>
where
    F: DeserializeOwned + Default,
{
    let Some((raw, body)) = split_frontmatter(content) else {
        return ParsedDocument {
            frontmatter: F::default(),
            body: content.to_string(),
        };
    };

    if raw.trim().is_empty() {
        return ParsedDocument {
            frontmatter: F::default(),
            body: body.to_string(),
        };
    }

    match serde_yaml_bw::from_str::<F>(raw) {
        Ok(frontmatter) => ParsedDocument {
            frontmatter,
            body: body.to_string(),
        },
        Err(e) => {
            tracing::debug!("Ignoring unparseable frontmatter: {}", e);
            ParsedDocument {
                frontmatter: F::default(),
                body: content.to_string(),
            }
        }
    }
}

/// Parses a document into untyped frontmatter and body.
///
/// Frontmatter that is valid YAML but not a mapping (e.g. a bare list) yields
/// empty metadata with the body still split off.
pub fn parse_document(content: &str) -> ParsedDocument<Frontmatter> {
    let doc = parse_frontmatter::<Value>(content);
    let frontmatter = match doc.frontmatter {
        Value::Object(map) => map,
        _ => Frontmatter::new(),
    };
    ParsedDocument {
        frontmatter,
        body: doc.body,
    }
}

/// Returns a non-empty string value for `key`.
pub fn frontmatter_str<'a>(frontmatter: &'a Frontmatter, key: &str) -> Option<&'a str> {
    frontmatter
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
