use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{Dimension, Extractor, RecordStore};
use crate::core::{FilterError, FilterValue, RecordId, Result};
use crate::filter::Predicate;

/// Registry of the dimensions defined for one view.
#[derive(Debug, Default)]
pub struct DimensionCatalog {
    dimensions: BTreeMap<String, Dimension>,
}

impl DimensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension, replacing any previous one with the same name.
    /// The replacement is indexed on first use.
    pub fn define(&mut self, name: impl Into<String>, extractor: Extractor) {
        self.insert(Dimension::new(name, extractor));
    }

    /// Shorthand for a dimension keyed by a dotted field path
    pub fn define_field(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.insert(Dimension::field(name, path));
    }

    pub fn insert(&mut self, dimension: Dimension) {
        let name = dimension.name().to_string();
        if self.dimensions.insert(name.clone(), dimension).is_some() {
            debug!(dimension = %name, "dimension redefined");
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.dimensions.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.dimensions.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Drop every cached index
    pub fn invalidate_all(&self) {
        for dimension in self.dimensions.values() {
            dimension.invalidate();
        }
    }

    fn dimension(&self, name: &str) -> Result<&Dimension> {
        self.get(name)
            .ok_or_else(|| FilterError::DimensionNotFound(name.to_string()))
    }

    /// Distinct keys present on a dimension, `Null` included
    pub fn values_for(&self, name: &str, store: &RecordStore) -> Result<BTreeSet<FilterValue>> {
        Ok(self.dimension(name)?.index(store).keys())
    }

    /// Record count per key
    pub fn bucket_sizes(
        &self,
        name: &str,
        store: &RecordStore,
    ) -> Result<BTreeMap<FilterValue, usize>> {
        Ok(self.dimension(name)?.index(store).bucket_sizes())
    }

    /// Ids of records whose key satisfies the predicate, in load order
    pub fn matching(
        &self,
        name: &str,
        predicate: &Predicate,
        store: &RecordStore,
    ) -> Result<Vec<RecordId>> {
        let positions = self.positions(name, predicate, store)?;
        let records = store.all();
        Ok(positions
            .into_iter()
            .map(|p| records[p].id().clone())
            .collect())
    }

    /// Load-order positions matching the predicate
    pub fn positions(
        &self,
        name: &str,
        predicate: &Predicate,
        store: &RecordStore,
    ) -> Result<Vec<usize>> {
        Ok(self.dimension(name)?.index(store).positions(predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;
    use serde_json::json;

    fn store() -> RecordStore {
        let mut store = RecordStore::new();
        store
            .load(vec![
                Record::new(1, json!({ "program": { "id": "A" }, "status": "active" })),
                Record::new(2, json!({ "program": { "id": "B" }, "status": "active" })),
                Record::new(3, json!({ "program": { "id": "A" }, "status": "inactive" })),
                Record::new(4, json!({ "status": "active" })),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_values_for_includes_unset_bucket() {
        let store = store();
        let mut catalog = DimensionCatalog::new();
        catalog.define_field("program", "program.id");

        let values = catalog.values_for("program", &store).unwrap();
        let expected: BTreeSet<FilterValue> =
            [FilterValue::Null, FilterValue::from("A"), FilterValue::from("B")].into();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_matching_returns_ids_in_load_order() {
        let store = store();
        let mut catalog = DimensionCatalog::new();
        catalog.define_field("program", "program.id");

        let ids = catalog
            .matching("program", &Predicate::one_of(["B", "A"]), &store)
            .unwrap();
        assert_eq!(ids, vec![RecordId::from(1), RecordId::from(2), RecordId::from(3)]);
    }

    #[test]
    fn test_redefine_replaces_extractor() {
        let store = store();
        let mut catalog = DimensionCatalog::new();
        catalog.define_field("key", "status");
        assert_eq!(catalog.bucket_sizes("key", &store).unwrap().len(), 2);

        catalog.define("key", Box::new(|r: &Record| FilterValue::Boolean(r.has("program"))));
        let sizes = catalog.bucket_sizes("key", &store).unwrap();
        assert_eq!(sizes[&FilterValue::Boolean(true)], 3);
        assert_eq!(sizes[&FilterValue::Boolean(false)], 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_unknown_dimension_is_an_error_for_direct_lookups() {
        let store = store();
        let catalog = DimensionCatalog::new();
        assert_eq!(
            catalog.values_for("nonexistent", &store).unwrap_err(),
            FilterError::DimensionNotFound("nonexistent".to_string())
        );
    }
}
