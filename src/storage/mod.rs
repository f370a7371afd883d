pub mod catalog;
pub mod dimension;
pub mod store;

pub use catalog::DimensionCatalog;
pub use dimension::{Dimension, DimensionIndex, Extractor};
pub use store::RecordStore;
