use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::config::ViewConfig;
use crate::core::{FilterError, Record, RecordId, Result};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Immutable snapshot of the records behind one view.
///
/// Every successful `load` takes a fresh process-wide `generation`, which
/// dimension indexes compare against to notice they were built for other
/// contents.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    positions: HashMap<RecordId, usize>,
    generation: u64,
    allow_duplicate_ids: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            allow_duplicate_ids: !config.reject_duplicate_ids,
            ..Self::default()
        }
    }

    /// Replace the contents. On error the previous contents stay in place.
    pub fn load(&mut self, records: Vec<Record>) -> Result<()> {
        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if positions.contains_key(record.id()) {
                if self.allow_duplicate_ids {
                    continue;
                }
                warn!(id = %record.id(), position, "rejecting load with duplicate record id");
                return Err(FilterError::DuplicateRecordId(record.id().to_string()));
            }
            positions.insert(record.id().clone(), position);
        }

        self.records = records;
        self.positions = positions;
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        debug!(
            records = self.records.len(),
            generation = self.generation,
            "record store loaded"
        );
        Ok(())
    }

    /// All records in load order
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.position(id).map(|p| &self.records[p])
    }

    /// Load-order position of the first record with this id
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
