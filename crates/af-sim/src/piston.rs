//! Screw-driven piston: the float's buoyancy actuator.
//!
//! A motor turns a screw by `phi` (rad); the screw pushes a piston of radius
//! `a` out by `d`, adding volume `vol` to the float. All three are affine in
//! each other:
//!
//! ```text
//! d   = d_min + (phi - phi_min) * lead / (2 pi)
//! vol = vol_min + (d - d_min) * pi a^2
//! ```
//!
//! The motor has a minimum rate below which it does not turn and a maximum
//! rate it cannot exceed.

use crate::error::{SimError, SimResult};
use af_core::{deg_per_s, radps, rpm, sign, to_radps};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::{info, warn};

/// Piston parameters.
///
/// One of `d_max` or `vol_max` must be given; the other is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PistonConfig {
    /// Piston radius (m)
    pub a: f64,
    /// Initial screw angle (rad)
    pub phi: f64,
    /// Screw lead: displacement per revolution (m)
    pub lead: f64,
    /// Angle when fully in (rad)
    pub phi_min: f64,
    /// Displacement when fully in (m)
    pub d_min: f64,
    /// Displacement when fully out (m)
    pub d_max: Option<f64>,
    /// Added volume when fully in (m³)
    pub vol_min: f64,
    /// Added volume when fully out (m³)
    pub vol_max: Option<f64>,
    /// Maximum rotation rate (rad/s)
    pub omega_max: f64,
    /// Minimum rotation rate (rad/s)
    pub omega_min: f64,
}

impl Default for PistonConfig {
    fn default() -> Self {
        Self {
            a: 0.025,
            phi: 0.0,
            lead: 0.0175,
            phi_min: 0.0,
            d_min: 0.0,
            d_max: None,
            vol_min: 0.0,
            vol_max: None,
            omega_max: to_radps(rpm(124.0)),
            omega_min: to_radps(rpm(12.4)),
        }
    }
}

impl PistonConfig {
    /// The ENSTA float piston: 7 cm of travel.
    pub fn ensta() -> Self {
        Self {
            d_max: Some(0.07),
            ..Self::default()
        }
    }
}

/// Piston state with its travel and rate limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Piston {
    a: f64,
    lead: f64,
    phi: f64,
    d: f64,
    vol: f64,
    omega: f64,
    dvdt: f64,
    phi_min: f64,
    phi_max: f64,
    d_min: f64,
    d_max: f64,
    vol_min: f64,
    vol_max: f64,
    omega_min: f64,
    omega_max: f64,
    saturated: bool,
}

impl Piston {
    /// Build a piston, deriving whichever of `d_max`/`vol_max` is missing.
    pub fn new(config: &PistonConfig) -> SimResult<Self> {
        let cfg = config;
        if !(cfg.a > 0.0 && cfg.a.is_finite()) {
            return Err(config_error(format!("piston radius must be positive, got {}", cfg.a)));
        }
        if !(cfg.lead > 0.0 && cfg.lead.is_finite()) {
            return Err(config_error(format!("screw lead must be positive, got {}", cfg.lead)));
        }
        if !(cfg.omega_min >= 0.0 && cfg.omega_max >= cfg.omega_min && cfg.omega_max.is_finite()) {
            return Err(config_error(format!(
                "rotation rate limits must satisfy 0 <= omega_min <= omega_max, got [{}, {}]",
                cfg.omega_min, cfg.omega_max
            )));
        }

        let mut piston = Self {
            a: cfg.a,
            lead: cfg.lead,
            phi: cfg.phi,
            d: 0.0,
            vol: 0.0,
            omega: 0.0,
            dvdt: 0.0,
            phi_min: cfg.phi_min,
            phi_max: cfg.phi_min,
            d_min: cfg.d_min,
            d_max: cfg.d_min,
            vol_min: cfg.vol_min,
            vol_max: cfg.vol_min,
            omega_min: cfg.omega_min,
            omega_max: cfg.omega_max,
            saturated: false,
        };

        match (cfg.vol_max, cfg.d_max) {
            (Some(vol_max), _) => {
                piston.vol_max = vol_max;
                piston.d_max = piston.vol2d(vol_max);
                info!(d_max = piston.d_max, "piston max displacement set from max volume");
            }
            (None, Some(d_max)) => {
                piston.d_max = d_max;
                piston.vol_max = piston.d2vol(d_max);
                info!(vol_max = piston.vol_max, "piston max volume set from max displacement");
            }
            (None, None) => {
                return Err(config_error("piston needs d_max or vol_max".to_string()));
            }
        }
        if !(piston.d_max > piston.d_min && piston.d_max.is_finite()) {
            return Err(config_error(format!(
                "piston travel is empty: d_min = {}, d_max = {}",
                piston.d_min, piston.d_max
            )));
        }

        piston.phi_max = piston.d2phi(piston.d_max);
        piston.clamp_phi();
        piston.broadcast_phi();
        piston.dvdt = piston.omega2dvdt(piston.omega);
        Ok(piston)
    }

    /// Advance by `dt` seconds while trying to achieve the volume rate `dvdt`.
    pub fn update(&mut self, dt: f64, dvdt: f64) {
        self.update_omega(self.dvdt2omega(dvdt));
        self.dvdt = self.omega2dvdt(self.omega);
        self.phi += self.omega * dt;
        let unclamped = self.phi;
        self.clamp_phi();
        let saturated = self.phi != unclamped;
        if saturated && !self.saturated {
            warn!(
                vol = self.phi2vol(self.phi),
                "piston reached the end of its travel"
            );
        }
        self.saturated = saturated;
        self.broadcast_phi();
    }

    /// Set the rotation rate, applying the motor deadband and rate limit.
    pub fn update_omega(&mut self, omega: f64) {
        self.omega = if omega.abs() < self.omega_min {
            0.0
        } else {
            sign(omega) * omega.abs().min(self.omega_max)
        };
    }

    /// Move straight to `vol` (clamped to the travel), ignoring rate limits.
    pub fn update_to_volume(&mut self, vol: f64) {
        self.phi = self.vol2phi(vol);
        self.clamp_phi();
        self.broadcast_phi();
    }

    fn clamp_phi(&mut self) {
        self.phi = self.phi.max(self.phi_min).min(self.phi_max);
    }

    fn broadcast_phi(&mut self) {
        self.d = self.phi2d(self.phi);
        self.vol = self.phi2vol(self.phi);
    }

    // Conversions

    pub fn omega2dvdt(&self, omega: f64) -> f64 {
        omega * self.lead / 2.0 * self.a * self.a
    }

    pub fn dvdt2omega(&self, dvdt: f64) -> f64 {
        dvdt / (self.lead / 2.0 * self.a * self.a)
    }

    pub fn phi2d(&self, phi: f64) -> f64 {
        self.d_min + (phi - self.phi_min) / (2.0 * PI) * self.lead
    }

    pub fn phi2vol(&self, phi: f64) -> f64 {
        self.d2vol(self.phi2d(phi))
    }

    pub fn d2phi(&self, d: f64) -> f64 {
        self.phi_min + (d - self.d_min) * 2.0 * PI / self.lead
    }

    pub fn d2vol(&self, d: f64) -> f64 {
        self.vol_min + (d - self.d_min) * PI * self.a * self.a
    }

    pub fn vol2d(&self, vol: f64) -> f64 {
        self.d_min + (vol - self.vol_min) / (PI * self.a * self.a)
    }

    pub fn vol2phi(&self, vol: f64) -> f64 {
        self.d2phi(self.vol2d(vol))
    }

    // State

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn lead(&self) -> f64 {
        self.lead
    }

    /// Screw angle (rad).
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Piston displacement (m).
    pub fn d(&self) -> f64 {
        self.d
    }

    /// Added volume (m³).
    pub fn vol(&self) -> f64 {
        self.vol
    }

    /// Rotation rate (rad/s).
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Volume rate (m³/s) at the current rotation rate.
    pub fn dvdt(&self) -> f64 {
        self.dvdt
    }

    pub fn phi_min(&self) -> f64 {
        self.phi_min
    }

    pub fn phi_max(&self) -> f64 {
        self.phi_max
    }

    pub fn d_min(&self) -> f64 {
        self.d_min
    }

    pub fn d_max(&self) -> f64 {
        self.d_max
    }

    pub fn vol_min(&self) -> f64 {
        self.vol_min
    }

    pub fn vol_max(&self) -> f64 {
        self.vol_max
    }

    pub fn omega_min(&self) -> f64 {
        self.omega_min
    }

    pub fn omega_max(&self) -> f64 {
        self.omega_max
    }
}

fn config_error(what: String) -> SimError {
    SimError::Config { what }
}

impl fmt::Display for Piston {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Piston parameters and state:")?;
        writeln!(f, "  a         = {:.2} cm     - piston radius", self.a * 1e2)?;
        writeln!(f, "  phi       = {:.2} rad    - present angle of rotation", self.phi)?;
        writeln!(f, "  d         = {:.2} cm     - present piston displacement", self.d * 1e2)?;
        writeln!(f, "  vol       = {:.2} cm^3   - present volume addition", self.vol * 1e6)?;
        writeln!(f, "  lead      = {:.2} cm     - screw lead", self.lead * 1e2)?;
        writeln!(f, "  phi_max   = {:.2} deg    - maximum rotation", self.phi_max.to_degrees())?;
        writeln!(f, "  phi_min   = {:.2} deg    - minimum rotation", self.phi_min.to_degrees())?;
        writeln!(f, "  d_max     = {:.2} cm     - maximum piston displacement", self.d_max * 1e2)?;
        writeln!(f, "  d_min     = {:.2} cm     - minimum piston displacement", self.d_min * 1e2)?;
        writeln!(f, "  vol_min   = {:.2} cm^3   - min volume displaced", self.vol_min * 1e6)?;
        writeln!(f, "  vol_max   = {:.2} cm^3   - max volume displaced", self.vol_max * 1e6)?;
        writeln!(
            f,
            "  omega_max = {:.2} deg/s  - maximum rotation rate",
            deg_per_s(radps(self.omega_max))
        )?;
        writeln!(
            f,
            "  omega_min = {:.2} deg/s  - minimum rotation rate",
            deg_per_s(radps(self.omega_min))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ensta() -> Piston {
        Piston::new(&PistonConfig::ensta()).unwrap()
    }

    #[test]
    fn travel_derived_from_displacement() {
        let p = ensta();
        assert_eq!(p.vol_max(), p.d2vol(0.07));
        assert_eq!(p.phi_max(), p.d2phi(0.07));
        // 7 cm of a 2.5 cm radius piston is about 137 cm³.
        assert!((p.vol_max() * 1e6 - 137.44).abs() < 0.01);
        assert_eq!(p.vol(), 0.0);
    }

    #[test]
    fn travel_derived_from_volume() {
        let cfg = PistonConfig {
            vol_max: Some(1e-4),
            d_max: Some(1.0),
            ..PistonConfig::default()
        };
        let p = Piston::new(&cfg).unwrap();
        // vol_max wins over d_max.
        assert!((p.d_max() - 1e-4 / (PI * 0.025 * 0.025)).abs() < 1e-12);
    }

    #[test]
    fn missing_travel_is_fatal() {
        let err = Piston::new(&PistonConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::Config { .. }));
    }

    #[test]
    fn nonphysical_geometry_is_fatal() {
        let cfg = PistonConfig {
            a: 0.0,
            ..PistonConfig::ensta()
        };
        assert!(Piston::new(&cfg).is_err());
        let cfg = PistonConfig {
            d_max: Some(-0.01),
            ..PistonConfig::ensta()
        };
        assert!(Piston::new(&cfg).is_err());
    }

    #[test]
    fn initial_angle_is_clamped() {
        let cfg = PistonConfig {
            phi: 1e6,
            ..PistonConfig::ensta()
        };
        let p = Piston::new(&cfg).unwrap();
        assert_eq!(p.phi(), p.phi_max());
        assert!((p.vol() - p.vol_max()).abs() < 1e-15);
        assert!((p.d() - 0.07).abs() < 1e-12);
    }

    #[test]
    fn slow_commands_are_ignored() {
        let mut p = ensta();
        p.update_to_volume(5e-5);
        let before = p.vol();
        let slow = p.omega2dvdt(0.5 * p.omega_min());
        p.update(10.0, slow);
        assert_eq!(p.omega(), 0.0);
        assert_eq!(p.dvdt(), 0.0);
        assert_eq!(p.vol(), before);
    }

    #[test]
    fn fast_commands_are_limited() {
        let mut p = ensta();
        p.update_to_volume(5e-5);
        p.update(0.1, -1.0);
        assert_eq!(p.omega(), -p.omega_max());
        assert!((p.dvdt() - p.omega2dvdt(-p.omega_max())).abs() < 1e-18);
    }

    #[test]
    fn update_to_volume_clamps() {
        let mut p = ensta();
        p.update_to_volume(1.0);
        assert!((p.vol() - p.vol_max()).abs() < 1e-15);
        p.update_to_volume(-1.0);
        assert_eq!(p.vol(), p.vol_min());
        assert_eq!(p.phi(), p.phi_min());
    }

    #[test]
    fn display_lists_parameters() {
        let text = ensta().to_string();
        assert!(text.starts_with("Piston parameters and state:"));
        assert!(text.contains("d_max     = 7.00 cm"));
        // 124 rpm
        assert!(text.contains("omega_max = 744.00 deg/s"));
    }

    proptest! {
        #[test]
        fn conversions_invert(vol in 0.0..1.3e-4f64, d in 0.0..0.07f64) {
            let p = ensta();
            prop_assert!((p.phi2vol(p.vol2phi(vol)) - vol).abs() < 1e-15);
            prop_assert!((p.phi2d(p.d2phi(d)) - d).abs() < 1e-14);
            prop_assert!((p.dvdt2omega(p.omega2dvdt(d)) - d).abs() < 1e-14);
        }

        #[test]
        fn updates_respect_limits(
            start in 0.0..1.37e-4f64,
            commands in proptest::collection::vec((0.01..20.0f64, -1e-4..1e-4f64), 1..50),
        ) {
            let mut p = ensta();
            p.update_to_volume(start);
            for (dt, dvdt) in commands {
                p.update(dt, dvdt);
                prop_assert!(p.phi() >= p.phi_min() && p.phi() <= p.phi_max());
                let omega = p.omega().abs();
                prop_assert!(omega == 0.0 || (omega >= p.omega_min() && omega <= p.omega_max()));
                prop_assert!(p.vol() >= p.vol_min() && p.vol() <= p.vol_max() + 1e-15);
            }
        }
    }
}
