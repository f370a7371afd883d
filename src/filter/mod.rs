pub mod predicate;
pub mod state;

pub use predicate::Predicate;
pub use state::FilterState;
