use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NutriError {
    /// Raw row rejected by the alias index builder. `row` is the 0-based data row index.
    #[error("Malformed record at row {row}: missing or invalid field '{field}'")]
    MalformedRecord { row: usize, field: &'static str },

    #[error("Nutrition database unavailable at {path:?}: {reason}")]
    DatabaseUnavailable { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type NutriResult<T> = std::result::Result<T, NutriError>;
