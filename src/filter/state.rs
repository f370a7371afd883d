use im::OrdMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use super::Predicate;
use crate::core::{FilterError, Result};

/// Active filters keyed by dimension name.
///
/// Owned by whoever drives the view and passed explicitly into projection.
/// Snapshots from `active()` share structure with the live map, so taking one
/// per render is cheap. Serializes as the session filter map, see `to_json`.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    filters: OrdMap<String, Predicate>,
    revision: u64,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one dimension's filter; `None` clears it.
    pub fn set_filter(&mut self, dimension: impl Into<String>, predicate: Option<Predicate>) {
        let dimension = dimension.into();
        match predicate {
            Some(predicate) => {
                self.filters.insert(dimension, predicate);
            }
            None => {
                self.filters.remove(&dimension);
            }
        }
        self.revision += 1;
    }

    pub fn clear(&mut self, dimension: &str) {
        self.set_filter(dimension, None);
    }

    pub fn clear_all(&mut self) {
        self.filters = OrdMap::new();
        self.revision += 1;
    }

    /// Read-only snapshot of the active filters
    pub fn active(&self) -> OrdMap<String, Predicate> {
        self.filters.clone()
    }

    pub fn get(&self, dimension: &str) -> Option<&Predicate> {
        self.filters.get(dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Predicate)> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Counter bumped by every mutation, for callers that cache projections.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Build from a session filter map: `{ "status": ["ACTIVE"], "program": 3, "legacy": null }`.
    /// `null` entries are treated as cleared.
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        let map = json.as_object().ok_or_else(|| {
            FilterError::Json(format!("filter map must be a JSON object, got {}", json))
        })?;

        let mut state = Self::new();
        for (dimension, value) in map {
            if !value.is_null() {
                state.set_filter(dimension.clone(), Some(Predicate::from_json(value)));
            }
        }
        Ok(state)
    }

    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .filters
            .iter()
            .map(|(dimension, predicate)| (dimension.clone(), predicate.to_json()))
            .collect();
        JsonValue::Object(map)
    }
}

// Two states are equal when they filter the same way, whatever their history.
impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.filters == other.filters
    }
}

impl Serialize for FilterState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Self::from_json(&json).map_err(serde::de::Error::custom)
    }
}
