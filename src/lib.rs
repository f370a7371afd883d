// ============================================================================
// studyfilter Library
// ============================================================================

//! In-memory multi-dimensional filtering for entity lists.
//!
//! A [`FilterView`] holds one snapshot of records fetched from a backend and
//! a set of named dimensions over them. A [`FilterState`] says which values
//! are allowed on which dimension, and [`FilterView::recompute`] returns the
//! records passing every active filter, always in load order.
//!
//! # Examples
//!
//! ```
//! use studyfilter::{FilterState, Predicate, RecordId};
//! use studyfilter::study::{labels, study_list_view};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let studies = json!([
//!     { "id": 1, "program": { "id": 10 }, "status": "ACTIVE", "owner": { "id": 7 } },
//!     { "id": 2, "program": { "id": 20 }, "status": "ACTIVE", "owner": { "id": 8 } },
//!     { "id": 3, "program": { "id": 10 }, "status": "COMPLETE", "owner": { "id": 7 } }
//! ]);
//! let view = study_list_view(&studies, Some(&RecordId::from(7)))?;
//!
//! let mut filters = FilterState::new();
//! filters.set_filter(labels::PROGRAM, Some(Predicate::equals(10)));
//! filters.set_filter(labels::STATUS, Some(Predicate::one_of(["ACTIVE", "ON_HOLD"])));
//!
//! let projection = view.recompute(&filters);
//! assert_eq!(projection.ids(), vec![RecordId::from(1)]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod facade;
pub mod filter;
pub mod json;
pub mod result;
pub mod storage;
pub mod study;

// Re-export main types for convenience
pub use crate::config::ViewConfig;
pub use crate::core::{FilterError, FilterValue, Record, RecordId, Result};
pub use crate::facade::{FilterSession, FilterView, ProjectionObserver};
pub use crate::filter::{FilterState, Predicate};
pub use crate::result::Projection;
