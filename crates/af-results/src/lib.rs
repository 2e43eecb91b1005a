//! af-results: in-memory trajectory log of a simulation run.

pub mod log;

pub use log::{LogField, TrajectoryLog, TrajectorySample};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown log field: {name}")]
    UnknownField { name: String },
}
