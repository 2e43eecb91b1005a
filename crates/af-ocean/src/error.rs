//! Water column errors.

use thiserror::Error;

/// Result type for water column operations.
pub type OceanResult<T> = Result<T, OceanError>;

/// Errors raised while building a water column or querying the oracle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OceanError {
    /// Profile arrays are inconsistent (lengths, ordering, too few levels).
    #[error("Invalid profile: {what}")]
    InvalidProfile { what: String },

    /// Non-finite value in profile data.
    #[error("Non-finite profile value for {what} at level {level}")]
    NonFinite { what: &'static str, level: usize },
}
