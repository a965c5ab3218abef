use std::fmt::Write as _;

use serde_json::Value;

use super::FormatExtractor;
use crate::models::UploadedFile;
use crate::types::{ExtractError, ExtractionResult, FormatKind};

/// Pretty-printed JSON followed by a short structure analysis.
pub struct JsonExtractor;

/// Shape of a parsed JSON document's root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonStructure {
    Object { keys: Vec<String> },
    Array { len: usize, sample_keys: Option<Vec<String>> },
    Scalar(&'static str),
}

impl JsonStructure {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(map) => JsonStructure::Object {
                keys: map.keys().cloned().collect(),
            },
            Value::Array(items) => JsonStructure::Array {
                len: items.len(),
                sample_keys: items
                    .first()
                    .and_then(Value::as_object)
                    .map(|first| first.keys().cloned().collect()),
            },
            Value::Null => JsonStructure::Scalar("null"),
            Value::Bool(_) => JsonStructure::Scalar("boolean"),
            Value::Number(n) if n.is_f64() => JsonStructure::Scalar("number"),
            Value::Number(_) => JsonStructure::Scalar("integer"),
            Value::String(_) => JsonStructure::Scalar("string"),
        }
    }

    fn render(&self) -> String {
        let mut out = String::from("Structure Analysis:\n");
        match self {
            JsonStructure::Object { keys } => {
                let _ = writeln!(out, "- Root type: Dictionary with {} keys", keys.len());
                let _ = writeln!(out, "- Keys: {}", key_list(keys));
            }
            JsonStructure::Array { len, sample_keys } => {
                let _ = writeln!(out, "- Root type: Array with {len} items");
                if let Some(keys) = sample_keys {
                    let _ = writeln!(out, "- Sample keys in first item: {}", key_list(keys));
                }
            }
            JsonStructure::Scalar(type_name) => {
                let _ = writeln!(out, "- Root type: {type_name}");
            }
        }
        out
    }
}

/// Keys as a JSON array, in document order
fn key_list(keys: &[String]) -> String {
    serde_json::to_string(keys).unwrap_or_default()
}

impl FormatExtractor for JsonExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Json
    }

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError> {
        let value: Value = serde_json::from_slice(&file.bytes).map_err(|e| {
            if e.is_io() {
                ExtractError::decode(FormatKind::Json, e)
            } else {
                ExtractError::MalformedJson(e.to_string())
            }
        })?;
        // to_string_pretty indents by two spaces and leaves non-ASCII unescaped
        let formatted =
            serde_json::to_string_pretty(&value).map_err(|e| ExtractError::decode(FormatKind::Json, e))?;

        let mut content = format!("JSON file: {}\n\nJSON Content:\n{}\n\n", file.name, formatted);
        content.push_str(&JsonStructure::of(&value).render());
        Ok(ExtractionResult::Text(content))
    }
}
