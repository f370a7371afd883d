use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::{Record, RecordId};
use crate::filter::FilterState;
use crate::storage::{DimensionCatalog, RecordStore};

/// The records that pass every active filter, in load order.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    records: Vec<&'a Record>,
    total: usize,
    applied: Vec<String>,
    ignored: Vec<String>,
}

impl<'a> Projection<'a> {
    /// Evaluate `state` against the store from scratch.
    ///
    /// Each active filter yields one candidate set from its dimension's
    /// index; a record survives when it is in all of them. Filters naming a
    /// dimension the catalog does not know are skipped and reported in
    /// `ignored()`. Nothing in the store, catalog or state is changed apart
    /// from warming index caches.
    pub fn compute(
        store: &'a RecordStore,
        catalog: &DimensionCatalog,
        state: &FilterState,
    ) -> Self {
        let mut hits = vec![0usize; store.len()];
        let mut applied = Vec::new();
        let mut ignored = Vec::new();

        for (name, predicate) in state.iter() {
            let Some(dimension) = catalog.get(name) else {
                debug!(dimension = %name, "ignoring filter on undefined dimension");
                ignored.push(name.clone());
                continue;
            };

            debug!(dimension = %name, predicate = %predicate, "applying filter");
            // Positions within one dimension are distinct, so each filter
            // counts a record at most once
            for position in dimension.index(store).positions(predicate) {
                hits[position] += 1;
            }
            applied.push(name.clone());
        }

        let required = applied.len();
        let records: Vec<&Record> = store
            .all()
            .iter()
            .zip(&hits)
            .filter(|(_, count)| **count == required)
            .map(|(record, _)| record)
            .collect();

        debug!(
            visible = records.len(),
            total = store.len(),
            filters = required,
            "projection computed"
        );

        Self {
            records,
            total: store.len(),
            applied,
            ignored,
        }
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Size of the unfiltered store
    pub fn total(&self) -> usize {
        self.total
    }

    /// Filters that narrowed the result
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Filters skipped because their dimension is not defined
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Record bodies as a JSON array, ready for the presentation layer
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.records.iter().map(|r| r.body().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Predicate;
    use serde_json::json;

    fn fixture() -> (RecordStore, DimensionCatalog) {
        let mut store = RecordStore::new();
        store
            .load(vec![
                Record::new(1, json!({ "program": "A", "status": "active" })),
                Record::new(2, json!({ "program": "B", "status": "active" })),
                Record::new(3, json!({ "program": "A", "status": "inactive" })),
            ])
            .unwrap();
        let mut catalog = DimensionCatalog::new();
        catalog.define_field("program", "program");
        catalog.define_field("status", "status");
        (store, catalog)
    }

    #[test]
    fn test_no_filters_yields_everything() {
        let (store, catalog) = fixture();
        let projection = Projection::compute(&store, &catalog, &FilterState::new());
        assert_eq!(projection.ids(), vec![RecordId::from(1), RecordId::from(2), RecordId::from(3)]);
        assert_eq!(projection.total(), 3);
        assert!(projection.applied().is_empty());
    }

    #[test]
    fn test_filters_intersect() {
        let (store, catalog) = fixture();
        let mut state = FilterState::new();
        state.set_filter("program", Some(Predicate::equals("A")));
        state.set_filter("status", Some(Predicate::equals("active")));

        let projection = Projection::compute(&store, &catalog, &state);
        assert_eq!(projection.ids(), vec![RecordId::from(1)]);
        assert_eq!(projection.applied(), &["program".to_string(), "status".to_string()]);
    }

    #[test]
    fn test_undefined_dimension_is_reported_not_applied() {
        let (store, catalog) = fixture();
        let mut state = FilterState::new();
        state.set_filter("nonexistent", Some(Predicate::equals(1)));

        let projection = Projection::compute(&store, &catalog, &state);
        assert_eq!(projection.len(), 3);
        assert_eq!(projection.ignored(), &["nonexistent".to_string()]);
    }

    #[test]
    fn test_empty_store() {
        let store = RecordStore::new();
        let mut catalog = DimensionCatalog::new();
        catalog.define_field("status", "status");
        let mut state = FilterState::new();
        state.set_filter("status", Some(Predicate::equals("active")));

        let projection = Projection::compute(&store, &catalog, &state);
        assert!(projection.is_empty());
        assert_eq!(projection.to_json(), json!([]));
    }
}
