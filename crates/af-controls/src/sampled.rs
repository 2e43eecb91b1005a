//! Sample-time tests for fixed-step loops.
//!
//! A fixed-step loop never lands exactly on multiples of a sampling period
//! once rounding accumulates in `t`. An event is therefore due whenever the
//! current time is within a quarter step of a multiple of the period.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// True when `t` is within `0.25 * dt_step` of a multiple of `dt`.
pub fn t_modulo_dt(t: f64, dt: f64, dt_step: f64) -> bool {
    let threshold = 0.25 * dt_step / dt;
    let phase = t / dt;
    (phase - phase.round()).abs() < threshold
}

/// Sample configuration for a periodic event (logging, control).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Sample period in seconds.
    pub dt: f64,
}

impl SampleConfig {
    /// Create a new sample configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is not positive and finite.
    pub fn new(dt: f64) -> ControlResult<Self> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "sample period must be positive",
            });
        }
        Ok(Self { dt })
    }

    /// Whether a sample is due at `t` for a loop advancing by `dt_step`.
    pub fn is_due(&self, t: f64, dt_step: f64) -> bool {
        t_modulo_dt(t, self.dt, dt_step)
    }
}
