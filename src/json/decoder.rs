//! Record decoder
//!
//! Turns the body of a list endpoint (a JSON array of objects) into
//! `Record`s. The whole payload is checked before anything is returned, so a
//! single bad element rejects the batch.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::core::record::lookup_path;
use crate::core::{FilterError, Record, RecordId, Result};

#[derive(Debug, Clone)]
pub struct RecordDecoder {
    id_field: String,
}

impl RecordDecoder {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Decode an already parsed payload
    pub fn decode(&self, payload: &JsonValue) -> Result<Vec<Record>> {
        let items = payload.as_array().ok_or_else(|| {
            FilterError::Json(format!(
                "expected a JSON array of records, got {}",
                json_kind(payload)
            ))
        })?;

        items
            .iter()
            .enumerate()
            .map(|(position, item)| self.decode_one(position, item))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|err| warn!(error = %err, "record payload rejected"))
    }

    /// Decode payload text
    pub fn parse(&self, text: &str) -> Result<Vec<Record>> {
        let payload: JsonValue = serde_json::from_str(text)?;
        self.decode(&payload)
    }

    /// Decode a payload saved to disk
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let text = fs::read_to_string(path.as_ref())?;
        self.parse(&text)
    }

    fn decode_one(&self, position: usize, item: &JsonValue) -> Result<Record> {
        if !item.is_object() {
            return Err(FilterError::MalformedRecord {
                position,
                reason: format!("expected an object, got {}", json_kind(item)),
            });
        }

        let raw_id = lookup_path(item, &self.id_field).ok_or_else(|| {
            FilterError::MalformedRecord {
                position,
                reason: format!("missing identifier '{}'", self.id_field),
            }
        })?;

        let id = RecordId::from_json(raw_id).ok_or_else(|| FilterError::MalformedRecord {
            position,
            reason: format!(
                "identifier '{}' must be an integer or a string, got {}",
                self.id_field,
                json_kind(raw_id)
            ),
        })?;

        Ok(Record::new(id, item.clone()))
    }
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new("id")
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
