use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Malformed record at position {position}: {reason}")]
    MalformedRecord { position: usize, reason: String },

    #[error("Duplicate record id '{0}'")]
    DuplicateRecordId(String),

    #[error("Dimension '{0}' not found")]
    DimensionNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
