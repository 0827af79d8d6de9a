//! JSON-backed records.
//!
//! Helpers for data operations whose payload arrives as JSON (an HTTP response body, a
//! fixture file, a message). Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested arrays/objects become their JSON text; everything else maps onto [`Value`].

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::{Record, Value};

/// Failure to turn JSON text into records.
#[derive(Debug, Error)]
pub enum JsonRecordsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid ndjson at line {line}: {source}")]
    Ndjson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("row {row} is not a json object")]
    NotAnObject { row: usize },

    #[error("json must be an object, an array of objects, or NDJSON")]
    UnsupportedShape,
}

/// Read a JSON/NDJSON file into records.
pub fn records_from_json_path(path: impl AsRef<Path>) -> Result<Vec<Record>, JsonRecordsError> {
    let text = fs::read_to_string(path)?;
    records_from_json_str(&text)
}

/// Parse JSON/NDJSON text into records. Empty input yields no records.
pub fn records_from_json_str(input: &str) -> Result<Vec<Record>, JsonRecordsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return match v {
            serde_json::Value::Array(items) => records_from_json_values(items),
            serde_json::Value::Object(_) => records_from_json_values(vec![v]),
            _ => Err(JsonRecordsError::UnsupportedShape),
        };
    }

    // Fall back to NDJSON.
    let mut values = Vec::new();
    for (i, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<serde_json::Value>(line)
            .map_err(|source| JsonRecordsError::Ndjson { line: i + 1, source })?;
        values.push(v);
    }
    records_from_json_values(values)
}

/// Convert already-parsed JSON values into records.
pub fn records_from_json_values(
    values: Vec<serde_json::Value>,
) -> Result<Vec<Record>, JsonRecordsError> {
    values
        .into_iter()
        .enumerate()
        .map(|(idx0, v)| match v {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()),
            _ => Err(JsonRecordsError::NotAnObject { row: idx0 + 1 }),
        })
        .collect()
}
