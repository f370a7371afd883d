pub mod error;
pub mod record;
pub mod value;

pub use error::{FilterError, Result};
pub use record::{Record, RecordId};
pub use value::FilterValue;
