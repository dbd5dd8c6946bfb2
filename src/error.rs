use thiserror::Error;

#[derive(Error, Debug)]
pub enum PerimeterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed group {group}: only {reached} of {cells} cells are edge-connected")]
    MalformedGroup {
        group: String,
        cells: usize,
        reached: usize,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid tiles payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PerimeterError>;
