use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::FilterValue;

/// Stable identifier of a record. Backends hand out numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Integer(i64),
    Text(String),
}

impl RecordId {
    /// Read an identifier out of a JSON value. Only integers and strings qualify.
    pub fn from_json(json: &JsonValue) -> Option<Self> {
        match json {
            JsonValue::Number(n) => n.as_i64().map(Self::Integer),
            JsonValue::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// The id as a dimension key, for comparisons against extracted values.
    pub fn to_filter_value(&self) -> FilterValue {
        match self {
            Self::Integer(i) => FilterValue::Integer(*i),
            Self::Text(s) => FilterValue::Text(s.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for RecordId {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One entity fetched from the backend. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    id: RecordId,
    body: JsonValue,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, body: JsonValue) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn body(&self) -> &JsonValue {
        &self.body
    }

    /// Raw JSON at a dotted path such as `program.id`.
    pub fn lookup(&self, path: &str) -> Option<&JsonValue> {
        lookup_path(&self.body, path)
    }

    /// Value at a dotted path; any missing segment yields `FilterValue::Null`.
    pub fn field(&self, path: &str) -> FilterValue {
        self.lookup(path)
            .map(FilterValue::from)
            .unwrap_or(FilterValue::Null)
    }

    /// Whether the path resolves to something other than JSON `null`.
    pub fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some_and(|v| !v.is_null())
    }
}

pub(crate) fn lookup_path<'a>(root: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(root, |node, segment| match node {
        JsonValue::Object(map) => map.get(segment),
        JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn study() -> Record {
        Record::new(
            1,
            json!({
                "id": 1,
                "status": "ACTIVE",
                "program": { "id": 10, "name": "Oncology" },
                "collaborator": null,
                "users": [{ "id": 4 }, { "id": 5 }]
            }),
        )
    }

    #[test]
    fn test_field_walks_dotted_paths() {
        let record = study();
        assert_eq!(record.field("program.id"), FilterValue::Integer(10));
        assert_eq!(record.field("status"), FilterValue::from("ACTIVE"));
        assert_eq!(record.field("users.1.id"), FilterValue::Integer(5));
    }

    #[test]
    fn test_missing_segments_are_null() {
        let record = study();
        assert_eq!(record.field("owner.id"), FilterValue::Null);
        assert_eq!(record.field("status.code"), FilterValue::Null);
        assert_eq!(record.field("users.9.id"), FilterValue::Null);
    }

    #[test]
    fn test_has_treats_json_null_as_absent() {
        let record = study();
        assert!(record.has("program"));
        assert!(!record.has("collaborator"));
        assert!(!record.has("owner"));
    }

    #[test]
    fn test_record_id_from_json() {
        assert_eq!(RecordId::from_json(&json!(3)), Some(RecordId::Integer(3)));
        assert_eq!(RecordId::from_json(&json!("ST-3")), Some(RecordId::from("ST-3")));
        assert_eq!(RecordId::from_json(&json!(null)), None);
        assert_eq!(RecordId::from_json(&json!(1.5)), None);
        assert_eq!(RecordId::from_json(&json!(true)), None);
    }
}
