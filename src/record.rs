//! Artwork records read from `works.json`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One exhibited work. Missing keys read as empty strings; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub creator: String,
    #[serde(deserialize_with = "lenient_string")]
    pub grade: String,
    #[serde(deserialize_with = "lenient_string")]
    pub medium: String,
    #[serde(deserialize_with = "lenient_string")]
    pub size: String,
    #[serde(deserialize_with = "lenient_string")]
    pub concept: String,
    #[serde(deserialize_with = "lenient_string")]
    pub story: String,
}

impl WorkRecord {
    /// File stem used for the rendered card.
    pub fn file_stem(&self) -> &str {
        if self.id.is_empty() { "work" } else { &self.id }
    }

    /// Title wrapped in angle brackets, or empty when there is no title.
    pub fn bracketed_title(&self) -> String {
        if self.title.is_empty() {
            String::new()
        } else {
            format!("< {} >", self.title)
        }
    }
}

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<WorkRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read records {}", path.display()))?;
    parse_records(&raw).with_context(|| format!("failed to parse records {}", path.display()))
}

/// Parse records from JSON text.
pub fn parse_records(raw: &str) -> Result<Vec<WorkRecord>> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(items) = value else {
        return Err(anyhow!("expected a JSON array of works"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item).with_context(|| format!("invalid work at index {}", idx))
        })
        .collect()
}

// Numbers and booleans are accepted so hand-edited data files keep working.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
