//! Dimensions of the study list screen.
//!
//! Study records come from the backend's study list endpoint. The sidebar
//! filters by program, legacy flag, external collaborator, ownership and
//! status.

use serde_json::Value as JsonValue;

use crate::core::{FilterValue, Record, RecordId, Result};
use crate::facade::FilterView;

pub mod labels {
    pub const PROGRAM: &str = "program";
    pub const LEGACY: &str = "legacy";
    pub const EXTERNAL: &str = "external";
    pub const MY_STUDY: &str = "my_study";
    pub const STATUS: &str = "status";

    pub const ALL: [&str; 5] = [PROGRAM, LEGACY, EXTERNAL, MY_STUDY, STATUS];
}

/// Register the study list dimensions on `view`.
///
/// `my_study` depends on who is signed in; call this again with the new user
/// to redefine it.
pub fn define_study_dimensions(view: &mut FilterView, current_user: Option<&RecordId>) {
    view.define_field(labels::PROGRAM, "program.id");
    view.define_field(labels::LEGACY, "legacy");
    view.define_dimension(labels::EXTERNAL, |study: &Record| {
        FilterValue::Boolean(study.lookup("collaborator").is_some_and(truthy))
    });
    define_my_study(view, current_user);
    view.define_field(labels::STATUS, "status");
}

/// Redefine only the ownership dimension.
pub fn define_my_study(view: &mut FilterView, current_user: Option<&RecordId>) {
    let user = current_user.map(RecordId::to_filter_value);
    view.define_dimension(labels::MY_STUDY, move |study: &Record| {
        let mine = match &user {
            Some(user) => study.field("owner.id") == *user,
            None => false,
        };
        FilterValue::Boolean(mine)
    });
}

// Loose truthiness: `false`, `0`, `""` and null mean no collaborator.
fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// A fresh view with the study dimensions and the given study list loaded.
pub fn study_list_view(
    payload: &serde_json::Value,
    current_user: Option<&RecordId>,
) -> Result<FilterView> {
    let mut view = FilterView::new();
    define_study_dimensions(&mut view, current_user);
    view.load_json(payload)?;
    Ok(view)
}
