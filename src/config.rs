use serde::{Deserialize, Serialize};

use crate::core::{FilterError, Result};

/// Settings for one filter view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Dotted path of the identifier inside each backend record
    pub id_field: String,

    /// Fail a load that contains the same id twice
    pub reject_duplicate_ids: bool,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self {
            id_field: "id".to_string(),
            reject_duplicate_ids: true,
        }
    }

    /// Set the identifier path
    pub fn id_field(mut self, path: &str) -> Self {
        self.id_field = path.to_string();
        self
    }

    /// Allow or reject duplicate ids
    pub fn reject_duplicate_ids(mut self, reject: bool) -> Self {
        self.reject_duplicate_ids = reject;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.id_field.is_empty() {
            return Err(FilterError::InvalidConfig(
                "id_field cannot be empty".to_string(),
            ));
        }

        if self.id_field.split('.').any(str::is_empty) {
            return Err(FilterError::InvalidConfig(format!(
                "id_field '{}' contains an empty path segment",
                self.id_field
            )));
        }

        Ok(())
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::new()
    }
}
