//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while configuring or running a float.
#[derive(Error, Debug)]
pub enum SimError {
    /// Float or piston parameters that cannot describe a physical device.
    #[error("Configuration error: {what}")]
    Config { what: String },

    /// A query was made without enough information to answer it.
    #[error("Usage error: {what}")]
    Usage { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error(transparent)]
    Ocean(#[from] af_ocean::OceanError),

    #[error(transparent)]
    Control(#[from] af_controls::ControlError),

    #[error(transparent)]
    Core(#[from] af_core::CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<af_solver::SolverError> for SimError {
    fn from(e: af_solver::SolverError) -> Self {
        SimError::ConvergenceFailed {
            what: e.to_string(),
        }
    }
}
