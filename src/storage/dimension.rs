use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::RecordStore;
use crate::core::{FilterValue, Record};
use crate::filter::Predicate;

/// Maps a record to its key on one dimension.
pub type Extractor = Box<dyn Fn(&Record) -> FilterValue>;

/// Reverse index of one dimension: key -> load-order positions.
///
/// Every record of the store it was built from sits in exactly one bucket,
/// and each bucket is sorted ascending.
#[derive(Debug, Clone, Default)]
pub struct DimensionIndex {
    buckets: HashMap<FilterValue, Vec<usize>>,
    generation: u64,
}

impl DimensionIndex {
    /// Single pass over the store.
    pub fn build(store: &RecordStore, extractor: &dyn Fn(&Record) -> FilterValue) -> Self {
        let mut buckets: HashMap<FilterValue, Vec<usize>> = HashMap::new();
        for (position, record) in store.all().iter().enumerate() {
            buckets.entry(extractor(record)).or_default().push(position);
        }
        Self {
            buckets,
            generation: store.generation(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bucket(&self, key: &FilterValue) -> &[usize] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positions whose key satisfies the predicate, ascending.
    pub fn positions(&self, predicate: &Predicate) -> Vec<usize> {
        match predicate {
            Predicate::Equals(key) => self.bucket(key).to_vec(),
            Predicate::OneOf(keys) => {
                // Buckets are disjoint, so concatenating and sorting is a union
                let mut positions: Vec<usize> =
                    keys.iter().flat_map(|key| self.bucket(key)).copied().collect();
                positions.sort_unstable();
                positions
            }
        }
    }

    pub fn keys(&self) -> BTreeSet<FilterValue> {
        self.buckets.keys().cloned().collect()
    }

    pub fn bucket_sizes(&self) -> BTreeMap<FilterValue, usize> {
        self.buckets
            .iter()
            .map(|(key, positions)| (key.clone(), positions.len()))
            .collect()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// A named filter axis. Its index is built on first use and rebuilt whenever
/// the store it is asked about has a different generation.
pub struct Dimension {
    name: String,
    extractor: Extractor,
    index: RefCell<Option<Rc<DimensionIndex>>>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, extractor: Extractor) -> Self {
        Self {
            name: name.into(),
            extractor,
            index: RefCell::new(None),
        }
    }

    /// Dimension keyed by the value at a dotted path.
    pub fn field(name: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(name, Box::new(move |record: &Record| record.field(&path)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self, store: &RecordStore) -> Rc<DimensionIndex> {
        if let Some(index) = self.index.borrow().as_ref()
            && index.generation() == store.generation()
        {
            return Rc::clone(index);
        }

        let index = Rc::new(DimensionIndex::build(store, &*self.extractor));
        debug!(
            dimension = %self.name,
            records = store.len(),
            buckets = index.bucket_count(),
            "dimension index built"
        );
        *self.index.borrow_mut() = Some(Rc::clone(&index));
        index
    }

    pub fn invalidate(&self) {
        self.index.borrow_mut().take();
    }

    pub fn is_indexed(&self) -> bool {
        self.index.borrow().is_some()
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dimension")
            .field("name", &self.name)
            .field("indexed", &self.is_indexed())
            .finish()
    }
}
