//! Field-level tolerance for hand-written manifests.
//!
//! Only `name` is required. A malformed optional field is ignored with a
//! warning instead of rejecting the whole manifest, and a malformed
//! marketplace entry drops only that entry.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An optional field that falls back to `None` when its shape is wrong.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!("Ignoring malformed manifest field: {}", e);
            Ok(None)
        }
    }
}

/// A component path list given as a single path or an array of paths.
/// Non-string items are dropped; any other shape yields an empty list.
pub(crate) fn path_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::String(path) => vec![path],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(path) => Some(path),
                other => {
                    tracing::warn!("Ignoring non-string component path: {}", other);
                    None
                }
            })
            .collect(),
        other => {
            tracing::warn!("Ignoring malformed component path list: {}", other);
            Vec::new()
        }
    })
}

/// A list whose malformed items are skipped one by one.
pub(crate) fn each<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!("Expected a list of entries, found: {}", other);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Skipping malformed manifest entry: {}", e);
                None
            }
        })
        .collect())
}
