use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value as JsonValue;

use crate::config::ViewConfig;
use crate::core::{FilterValue, Record, RecordId, Result};
use crate::filter::{FilterState, Predicate};
use crate::json::RecordDecoder;
use crate::result::Projection;
use crate::storage::{DimensionCatalog, RecordStore};

/// Records plus the dimensions defined over them, for one view activation.
///
/// # Examples
///
/// ```
/// use studyfilter::{FilterState, FilterView, Predicate};
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut view = FilterView::new();
/// view.load_json(&json!([
///     { "id": 1, "status": "ACTIVE" },
///     { "id": 2, "status": "COMPLETE" }
/// ]))?;
/// view.define_field("status", "status");
///
/// let mut filters = FilterState::new();
/// filters.set_filter("status", Some(Predicate::equals("ACTIVE")));
/// assert_eq!(view.recompute(&filters).len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FilterView {
    config: ViewConfig,
    decoder: RecordDecoder,
    store: RecordStore,
    catalog: DimensionCatalog,
}

impl FilterView {
    pub fn new() -> Self {
        let config = ViewConfig::default();
        Self {
            decoder: RecordDecoder::new(config.id_field.clone()),
            store: RecordStore::from_config(&config),
            catalog: DimensionCatalog::new(),
            config,
        }
    }

    pub fn with_config(config: ViewConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            decoder: RecordDecoder::new(config.id_field.clone()),
            store: RecordStore::from_config(&config),
            catalog: DimensionCatalog::new(),
            config,
        })
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Replace the records. Indexes are rebuilt lazily on next access; on
    /// error the previous records and indexes stay valid.
    pub fn load(&mut self, records: Vec<Record>) -> Result<()> {
        self.store.load(records)?;
        self.catalog.invalidate_all();
        Ok(())
    }

    /// Decode a list payload and load it. Nothing changes if any element is malformed.
    pub fn load_json(&mut self, payload: &JsonValue) -> Result<()> {
        let records = self.decoder.decode(payload)?;
        self.load(records)
    }

    pub fn define_dimension<F>(&mut self, name: impl Into<String>, extractor: F)
    where
        F: Fn(&Record) -> FilterValue + 'static,
    {
        self.catalog.define(name, Box::new(extractor));
    }

    pub fn define_field(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.catalog.define_field(name, path);
    }

    pub fn remove_dimension(&mut self, name: &str) -> bool {
        self.catalog.remove(name)
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    pub fn dimension_names(&self) -> Vec<&str> {
        self.catalog.names()
    }

    pub fn values_for(&self, name: &str) -> Result<BTreeSet<FilterValue>> {
        self.catalog.values_for(name, &self.store)
    }

    pub fn bucket_sizes(&self, name: &str) -> Result<BTreeMap<FilterValue, usize>> {
        self.catalog.bucket_sizes(name, &self.store)
    }

    pub fn matching(&self, name: &str, predicate: &Predicate) -> Result<Vec<RecordId>> {
        self.catalog.matching(name, predicate, &self.store)
    }

    /// Unfiltered records in load order
    pub fn all(&self) -> &[Record] {
        self.store.all()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.store.get(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn catalog(&self) -> &DimensionCatalog {
        &self.catalog
    }

    /// Current visible records for `state`
    pub fn recompute(&self, state: &FilterState) -> Projection<'_> {
        Projection::compute(&self.store, &self.catalog, state)
    }
}

impl Default for FilterView {
    fn default() -> Self {
        Self::new()
    }
}
