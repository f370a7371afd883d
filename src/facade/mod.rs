pub mod session;
pub mod view;

pub use session::{FilterSession, ProjectionObserver};
pub use view::FilterView;
