//! Target depth trajectories.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Prescribed depth as a function of time.
///
/// Must be total over the simulated time domain (plus the small margin used
/// for finite differences) and smooth enough to differentiate twice.
pub trait DepthTrajectory {
    /// Target depth (m, negative downward) at time `t` (s).
    fn depth(&self, t: f64) -> f64;
}

impl<F> DepthTrajectory for F
where
    F: Fn(f64) -> f64,
{
    fn depth(&self, t: f64) -> f64 {
        self(t)
    }
}

/// Trajectories that can be described in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetTrajectory {
    /// Hold a fixed depth.
    Constant { z: f64 },
    /// Move linearly from `z_start` to `z_end` over `duration` seconds
    /// starting at `t_start`, holding the end values outside that window.
    Ramp {
        z_start: f64,
        z_end: f64,
        t_start: f64,
        duration: f64,
    },
    /// Half-cosine transition between two depths: zero velocity at both ends.
    Cosine {
        z_start: f64,
        z_end: f64,
        t_start: f64,
        duration: f64,
    },
}

impl TargetTrajectory {
    fn progress(t: f64, t_start: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return if t >= t_start { 1.0 } else { 0.0 };
        }
        ((t - t_start) / duration).clamp(0.0, 1.0)
    }
}

impl DepthTrajectory for TargetTrajectory {
    fn depth(&self, t: f64) -> f64 {
        match *self {
            TargetTrajectory::Constant { z } => z,
            TargetTrajectory::Ramp {
                z_start,
                z_end,
                t_start,
                duration,
            } => z_start + (z_end - z_start) * Self::progress(t, t_start, duration),
            TargetTrajectory::Cosine {
                z_start,
                z_end,
                t_start,
                duration,
            } => {
                let s = Self::progress(t, t_start, duration);
                z_start + (z_end - z_start) * 0.5 * (1.0 - (PI * s).cos())
            }
        }
    }
}
