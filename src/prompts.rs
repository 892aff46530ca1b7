// Batch input parsing. Two formats are accepted: a JSON document (a
// top-level array of strings, or an object with a `prompts` array) and
// plain text with one prompt per non-blank line.

use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Input file not found: {0}")]
    NotFound(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON input must be a list of strings or an object with a 'prompts' key")]
    BadShape,
}

/// Load the ordered prompt list from a file. Ordering is significant:
/// the batch dispatcher keys output files and the final summary off the
/// positions returned here.
pub fn load_prompts(path: &Path) -> Result<Vec<String>, PromptError> {
    if !path.exists() {
        return Err(PromptError::NotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).map_err(|source| PromptError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let value: Value = serde_json::from_str(&content).map_err(|source| PromptError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        prompts_from_json(value)
    } else {
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

fn prompts_from_json(value: Value) -> Result<Vec<String>, PromptError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("prompts") {
            Some(Value::Array(items)) => items,
            _ => return Err(PromptError::BadShape),
        },
        _ => return Err(PromptError::BadShape),
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(PromptError::BadShape),
        })
        .collect()
}
