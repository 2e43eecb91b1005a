//! Depth controller.
//!
//! Sliding-mode law on the third derivative of depth. With the tracking
//! error `e = z_target - z`, the sliding surface is
//!
//! ```text
//! s = e'' + (2/tau) e' + (1/tau^2) e
//! ```
//!
//! and the controller commands the depth jerk `d3y = d3y_gain * sign(s)`.
//! The plant's jerk responds to the piston through the net-force gradients,
//! which the law inverts for a volume rate:
//!
//! ```text
//! dv/dt = -(dF/dz w + dF/dw a + dF/dv dV/dz w - d3y) / dF/dv
//! ```
//!
//! with every gradient taken per unit mass.

use crate::error::{ControlError, ControlResult};
use crate::trajectory::DepthTrajectory;
use af_core::sign;
use serde::{Deserialize, Serialize};

/// Half-span of the central differences on the target trajectory (s).
const TARGET_DT: f64 = 0.05;

fn default_tau() -> f64 {
    60.0
}

/// Depth controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthController {
    /// Time constant of the sliding surface (s).
    #[serde(default = "default_tau")]
    pub tau: f64,
    /// Commanded jerk magnitude (m/s³).
    pub d3y_gain: f64,
    /// Depth error below which the piston is left alone (m).
    #[serde(default)]
    pub dz_nochattering: f64,
}

impl DepthController {
    /// Create a controller with the default time constant and no deadband.
    pub fn new(d3y_gain: f64) -> ControlResult<Self> {
        let controller = Self {
            tau: default_tau(),
            d3y_gain,
            dz_nochattering: 0.0,
        };
        controller.validate()?;
        Ok(controller)
    }

    /// Set the sliding-surface time constant.
    pub fn with_tau(mut self, tau: f64) -> ControlResult<Self> {
        self.tau = tau;
        self.validate()?;
        Ok(self)
    }

    /// Set the chatter deadband.
    pub fn with_deadband(mut self, dz: f64) -> ControlResult<Self> {
        self.dz_nochattering = dz;
        self.validate()?;
        Ok(self)
    }

    /// Check parameters, e.g. after deserialization.
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.tau > 0.0 && self.tau.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "tau must be positive",
            });
        }
        if !(self.d3y_gain > 0.0 && self.d3y_gain.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "d3y_gain must be positive",
            });
        }
        if !(self.dz_nochattering >= 0.0 && self.dz_nochattering.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "dz_nochattering must be non-negative",
            });
        }
        Ok(())
    }

    /// Whether the depth error is large enough to act on.
    pub fn is_active(&self, z: f64, z_target: f64) -> bool {
        (z - z_target).abs() > self.dz_nochattering
    }

    /// Sign of the sliding surface: +1, -1 or 0 exactly on it.
    pub fn switching_sign(&self, plant: &PlantState, target: &TargetKinematics) -> f64 {
        let s = target.acceleration - plant.accel
            + 2.0 / self.tau * (target.velocity - plant.w)
            + 1.0 / (self.tau * self.tau) * (target.depth - plant.z);
        sign(s)
    }

    /// Commanded jerk (m/s³).
    pub fn jerk(&self, plant: &PlantState, target: &TargetKinematics) -> f64 {
        self.d3y_gain * self.switching_sign(plant, target)
    }

    /// Volume rate (m³/s) that produces the commanded jerk.
    ///
    /// `gradients` are the raw net-force gradients; they are divided by
    /// `plant.mass` here.
    pub fn volume_rate(
        &self,
        plant: &PlantState,
        target: &TargetKinematics,
        gradients: &ForceGradients,
    ) -> ControlResult<f64> {
        let g = gradients.per_unit_mass(plant.mass);
        if g.dfdv == 0.0 || !g.dfdv.is_finite() {
            return Err(ControlError::Singular {
                what: format!("dF/dv = {} at z = {}", gradients.dfdv, plant.z),
            });
        }
        let d3y = self.jerk(plant, target);
        Ok(-(g.dfdz * plant.w + g.dfdw * plant.accel + g.dfdv * plant.dvdz * plant.w - d3y) / g.dfdv)
    }
}

/// Target depth and its first two time derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetKinematics {
    pub depth: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl TargetKinematics {
    /// Sample `target` at `t` with central differences over ±0.05 s.
    pub fn sample(target: &dyn DepthTrajectory, t: f64) -> Self {
        let before = target.depth(t - TARGET_DT);
        let depth = target.depth(t);
        let after = target.depth(t + TARGET_DT);
        Self {
            depth,
            velocity: (after - before) / (2.0 * TARGET_DT),
            acceleration: (after - 2.0 * depth + before) / (TARGET_DT * TARGET_DT),
        }
    }
}

/// Partial derivatives of the net force (N per unit of each variable).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceGradients {
    /// With respect to depth (N/m).
    pub dfdz: f64,
    /// With respect to vertical velocity (N s/m).
    pub dfdw: f64,
    /// With respect to added volume (N/m³).
    pub dfdv: f64,
}

impl ForceGradients {
    pub fn per_unit_mass(&self, mass: f64) -> Self {
        Self {
            dfdz: self.dfdz / mass,
            dfdw: self.dfdw / mass,
            dfdv: self.dfdv / mass,
        }
    }
}

/// Float state as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantState {
    /// Depth (m, negative downward).
    pub z: f64,
    /// Vertical velocity (m/s).
    pub w: f64,
    /// Net force per unit mass (m/s²).
    pub accel: f64,
    /// Change in float volume per metre of depth (m³/m).
    pub dvdz: f64,
    /// Float mass (kg).
    pub mass: f64,
}
