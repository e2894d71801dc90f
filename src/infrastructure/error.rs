use crate::application::validate::PlacementError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("placement rejected: {0}")]
    Placement(#[from] PlacementError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed import: {0}")]
    MalformedImport(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
