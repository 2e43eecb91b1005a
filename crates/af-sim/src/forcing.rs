//! External forcing of the water column.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Isopycnal displacement `eta(t)` (m, positive upward).
pub trait Displacement {
    fn displacement(&self, t: f64) -> f64;
}

impl<F> Displacement for F
where
    F: Fn(f64) -> f64,
{
    fn displacement(&self, t: f64) -> f64 {
        self(t)
    }
}

/// Displacements that can be described in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Isopycnal {
    #[default]
    None,
    /// Internal wave: `amplitude * sin(2 pi t / period)`.
    Sinusoidal { amplitude: f64, period: f64 },
}

impl Isopycnal {
    pub fn validate(&self) -> SimResult<()> {
        match *self {
            Isopycnal::None => Ok(()),
            Isopycnal::Sinusoidal { amplitude, period } => {
                if !amplitude.is_finite() || !(period > 0.0 && period.is_finite()) {
                    return Err(SimError::InvalidArg {
                        what: "isopycnal wave needs a finite amplitude and a positive period",
                    });
                }
                Ok(())
            }
        }
    }
}

impl Displacement for Isopycnal {
    fn displacement(&self, t: f64) -> f64 {
        match *self {
            Isopycnal::None => 0.0,
            Isopycnal::Sinusoidal { amplitude, period } => amplitude * (2.0 * PI * t / period).sin(),
        }
    }
}
