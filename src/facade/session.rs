use serde_json::Value as JsonValue;
use tracing::debug;

use super::FilterView;
use crate::core::{Record, Result};
use crate::filter::{FilterState, Predicate};
use crate::result::Projection;

/// Receives the fresh projection after every change to a session.
pub trait ProjectionObserver {
    fn projection_changed(&mut self, projection: &Projection<'_>);
}

/// A view together with the filter state driving it.
///
/// Every mutation recomputes the projection once and hands it to the
/// registered observers, which is the hook a UI binding uses to re-render.
pub struct FilterSession {
    view: FilterView,
    state: FilterState,
    observers: Vec<Box<dyn ProjectionObserver>>,
}

impl FilterSession {
    pub fn new(view: FilterView) -> Self {
        Self {
            view,
            state: FilterState::new(),
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl ProjectionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn view(&self) -> &FilterView {
        &self.view
    }

    /// Direct access for defining dimensions. Call `refresh` afterwards to
    /// notify observers.
    pub fn view_mut(&mut self) -> &mut FilterView {
        &mut self.view
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn load(&mut self, records: Vec<Record>) -> Result<()> {
        self.view.load(records)?;
        self.notify();
        Ok(())
    }

    pub fn load_json(&mut self, payload: &JsonValue) -> Result<()> {
        self.view.load_json(payload)?;
        self.notify();
        Ok(())
    }

    pub fn set_filter(&mut self, dimension: impl Into<String>, predicate: Option<Predicate>) {
        self.state.set_filter(dimension, predicate);
        self.notify();
    }

    pub fn clear_filter(&mut self, dimension: &str) {
        self.state.clear(dimension);
        self.notify();
    }

    pub fn clear_all(&mut self) {
        self.state.clear_all();
        self.notify();
    }

    /// Swap in a whole filter selection, e.g. one restored by the UI layer.
    pub fn replace_filters(&mut self, state: FilterState) {
        self.state = state;
        self.notify();
    }

    /// View entry: start from an empty filter selection.
    pub fn reset(&mut self) {
        debug!("filter session reset");
        self.state = FilterState::new();
        self.notify();
    }

    pub fn refresh(&mut self) {
        self.notify();
    }

    pub fn projection(&self) -> Projection<'_> {
        self.view.recompute(&self.state)
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let projection = self.view.recompute(&self.state);
        for observer in &mut self.observers {
            observer.projection_changed(&projection);
        }
    }
}
