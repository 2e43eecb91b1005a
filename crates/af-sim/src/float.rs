//! Float: a compressible cylinder with an optional buoyancy piston.
//!
//! The float's density depends on pressure through a mechanical
//! compressibility `gamma` and on temperature through a thermal expansion
//! coefficient `alpha`:
//!
//! ```text
//! rho_f = m / (V (1 - gamma p + alpha (temp - temp0)) + v)
//! ```
//!
//! where `V = pi a^2 L` is the hull volume and `v` the volume added by the
//! piston. The vertical force combines weight, buoyancy and a quadratic drag:
//!
//! ```text
//! F = -m g + m g rho_w / rho_f - (m / Lv) |w| w
//! ```

use crate::error::{SimError, SimResult};
use crate::piston::{Piston, PistonConfig};
use af_controls::ForceGradients;
use af_core::{Accel, central_difference, constants::G_MPS2, ensure_finite, mps2, to_mps2};
use af_ocean::WaterColumn;
use af_results::TrajectoryLog;
use af_solver::{NewtonConfig, solve_scalar};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::info;

/// Half-spans of the central differences in [`Float::force_gradients`].
const DZ_PROBE: f64 = 0.05;
const DW_PROBE: f64 = 0.005;
const DV_PROBE: f64 = 5e-5;

/// Float parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatConfig {
    /// Hull radius (m)
    pub a: f64,
    /// Hull length (m)
    #[serde(alias = "L")]
    pub length: f64,
    /// Mass (kg); `None` makes the hull as dense as fresh water
    pub m: Option<f64>,
    /// Mechanical compressibility (1/dbar)
    pub gamma: f64,
    /// Thermal expansion (1/°C)
    pub alpha: f64,
    /// Reference temperature for thermal expansion (°C)
    pub temp0: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            a: 0.05,
            length: 0.4,
            m: None,
            gamma: 2e-6,
            alpha: 7e-5,
            temp0: 15.0,
            gravity: G_MPS2,
        }
    }
}

/// What a density evaluation is conditioned on.
///
/// Either a pressure/temperature pair or a depth in a water column must be
/// given; the pair wins when both are.
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityQuery<'a> {
    /// Pressure (dbar)
    pub p: Option<f64>,
    /// Temperature (°C)
    pub temp: Option<f64>,
    /// Depth (m)
    pub z: Option<f64>,
    pub water: Option<&'a WaterColumn>,
    /// Added volume (m³); defaults to the float's current one
    pub v: Option<f64>,
}

impl<'a> DensityQuery<'a> {
    pub fn at(p: f64, temp: f64) -> Self {
        Self {
            p: Some(p),
            temp: Some(temp),
            ..Self::default()
        }
    }

    /// At depth `z`, in thermal equilibrium with the surrounding water.
    pub fn in_water(z: f64, water: &'a WaterColumn) -> Self {
        Self {
            z: Some(z),
            water: Some(water),
            ..Self::default()
        }
    }

    pub fn with_v(mut self, v: f64) -> Self {
        self.v = Some(v);
        self
    }
}

/// State at which the net force is evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceProbe {
    pub z: f64,
    pub w: f64,
    pub v: f64,
}

impl ForceProbe {
    pub fn from_float(float: &Float) -> Self {
        Self {
            z: float.z,
            w: float.w,
            v: float.v,
        }
    }
}

/// Force and speed envelope over a depth range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatBounds {
    /// Force at the top of the range with the piston fully out (N)
    pub f_max: f64,
    /// Force at the bottom of the range with the piston fully in (N)
    pub f_min: f64,
    /// Larger of the two magnitudes (N)
    pub f_abs_max: f64,
    /// Terminal speed under that force (m/s)
    pub w_max: f64,
}

/// Autonomous float.
#[derive(Debug, Clone)]
pub struct Float {
    a: f64,
    length: f64,
    hull_volume: f64,
    m: f64,
    gamma: f64,
    alpha: f64,
    temp0: f64,
    g: f64,
    z: f64,
    w: f64,
    v: f64,
    lv: Option<f64>,
    piston: Option<Piston>,
    log: Option<TrajectoryLog>,
}

impl Float {
    pub fn new(config: &FloatConfig) -> SimResult<Self> {
        let positive = [
            ("float radius", config.a),
            ("float length", config.length),
            ("gravity", config.gravity),
        ];
        for (what, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimError::Config {
                    what: format!("{what} must be positive, got {value}"),
                });
            }
        }
        ensure_finite(config.gamma, "gamma")?;
        ensure_finite(config.alpha, "alpha")?;
        ensure_finite(config.temp0, "temp0")?;

        let hull_volume = PI * config.a * config.a * config.length;
        let m = config.m.unwrap_or(1000.0 * hull_volume);
        if !(m > 0.0 && m.is_finite()) {
            return Err(SimError::Config {
                what: format!("float mass must be positive, got {m}"),
            });
        }

        Ok(Self {
            a: config.a,
            length: config.length,
            hull_volume,
            m,
            gamma: config.gamma,
            alpha: config.alpha,
            temp0: config.temp0,
            g: config.gravity,
            z: 0.0,
            w: 0.0,
            v: 0.0,
            lv: None,
            piston: None,
            log: None,
        })
    }

    /// Fit a piston, replacing any previous one.
    pub fn init_piston(&mut self, config: &PistonConfig) -> SimResult<()> {
        self.piston = Some(Piston::new(config)?);
        Ok(())
    }

    pub fn with_piston(mut self, config: &PistonConfig) -> SimResult<Self> {
        self.init_piston(config)?;
        Ok(self)
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Hull volume `pi a^2 L` (m³).
    pub fn hull_volume(&self) -> f64 {
        self.hull_volume
    }

    pub fn mass(&self) -> f64 {
        self.m
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn temp0(&self) -> f64 {
        self.temp0
    }

    pub fn gravity(&self) -> Accel {
        mps2(self.g)
    }

    /// Depth (m, never above the surface).
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Vertical velocity (m/s, positive upward).
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Added volume (m³).
    pub fn v(&self) -> f64 {
        self.v
    }

    /// Drag length of the last run.
    pub fn lv(&self) -> Option<f64> {
        self.lv
    }

    /// Drag length used when none is given: the last run's, else the hull length.
    pub fn effective_lv(&self) -> f64 {
        self.lv.unwrap_or(self.length)
    }

    pub fn set_z(&mut self, z: f64) {
        self.z = z.min(0.0);
    }

    pub fn set_w(&mut self, w: f64) {
        self.w = w;
    }

    /// Set the added volume. With a piston, it is moved there and the
    /// reachable volume kept.
    pub fn set_v(&mut self, v: f64) {
        match self.piston.as_mut() {
            Some(piston) => {
                piston.update_to_volume(v);
                self.v = piston.vol();
            }
            None => self.v = v,
        }
    }

    pub fn piston(&self) -> Option<&Piston> {
        self.piston.as_ref()
    }

    pub(crate) fn piston_mut(&mut self) -> Option<&mut Piston> {
        self.piston.as_mut()
    }

    /// Log of the last run, if it was logged.
    pub fn log(&self) -> Option<&TrajectoryLog> {
        self.log.as_ref()
    }

    pub fn take_log(&mut self) -> Option<TrajectoryLog> {
        self.log.take()
    }

    pub(crate) fn set_state_unchecked(&mut self, z: f64, w: f64, v: f64) {
        self.z = z;
        self.w = w;
        self.v = v;
    }

    pub(crate) fn set_lv(&mut self, lv: f64) {
        self.lv = Some(lv);
    }

    pub(crate) fn log_mut(&mut self) -> Option<&mut TrajectoryLog> {
        self.log.as_mut()
    }

    pub(crate) fn reset_log(&mut self, enabled: bool) {
        self.log = enabled.then(TrajectoryLog::new);
    }

    fn density_with_mass(&self, m: f64, p: f64, temp: f64, v: f64) -> f64 {
        m / (self.hull_volume * (1.0 - self.gamma * p + self.alpha * (temp - self.temp0)) + v)
    }

    /// Density (kg/m³) at pressure `p` (dbar), temperature `temp` (°C) and
    /// added volume `v` (m³).
    pub fn density_at(&self, p: f64, temp: f64, v: f64) -> f64 {
        self.density_with_mass(self.m, p, temp, v)
    }

    /// Density (kg/m³) for a query.
    pub fn density(&self, query: &DensityQuery<'_>) -> SimResult<f64> {
        let v = query.v.unwrap_or(self.v);
        match (query.p, query.temp, query.z, query.water) {
            (Some(p), Some(temp), _, _) => Ok(self.density_at(p, temp, v)),
            (_, _, Some(z), Some(water)) => {
                Ok(self.density_at(water.get_p(z), water.get_temp(z), v))
            }
            _ => Err(SimError::Usage {
                what: "density needs a pressure and temperature, or a depth and water column",
            }),
        }
    }

    /// Total volume `V + v` (m³) for a query.
    pub fn volume(&self, query: &DensityQuery<'_>) -> SimResult<f64> {
        Ok(self.m / self.density(query)?)
    }

    /// Added volume at which the float is neutrally buoyant in water of
    /// density `rho_eq` at pressure `p_eq` and temperature `temp_eq`.
    pub fn volume_for_equilibrium(&self, p_eq: f64, temp_eq: f64, rho_eq: f64) -> SimResult<f64> {
        let root = solve_scalar(
            |v| rho_eq - self.density_at(p_eq, temp_eq, v),
            0.0,
            &NewtonConfig::default(),
        )?;
        Ok(root.x)
    }

    /// Change the mass so that the float, with its current added volume, is
    /// neutrally buoyant at the given state. Returns the added mass (kg).
    pub fn adjust_mass(&mut self, p_eq: f64, temp_eq: f64, rho_eq: f64) -> SimResult<f64> {
        let m0 = self.m;
        let root = solve_scalar(
            |m| rho_eq - self.density_with_mass(m, p_eq, temp_eq, self.v),
            m0,
            &NewtonConfig::default(),
        )?;
        if !(root.x > 0.0) {
            return Err(SimError::NonPhysical {
                what: format!("equilibrium mass {} kg", root.x),
            });
        }
        self.m = root.x;
        let added = self.m - m0;
        info!(
            grams = added * 1e3,
            p_eq,
            "float mass adjusted for equilibrium"
        );
        Ok(added)
    }

    /// Net vertical force (N) at `probe`, with drag length `lv`.
    pub fn net_force(&self, water: &WaterColumn, probe: ForceProbe, lv: f64) -> f64 {
        let p = water.get_p(probe.z);
        let temp = water.get_temp(probe.z);
        let rho_w = water.get_rho(probe.z, false);
        let rho_f = self.density_at(p, temp, probe.v);
        let mg = self.m * to_mps2(self.gravity());
        -mg + mg * rho_w / rho_f - self.m / lv * probe.w.abs() * probe.w
    }

    /// Central-difference gradients of [`net_force`](Self::net_force) in
    /// depth, velocity and added volume.
    pub fn force_gradients(&self, water: &WaterColumn, probe: ForceProbe, lv: f64) -> ForceGradients {
        ForceGradients {
            dfdz: central_difference(
                |z| self.net_force(water, ForceProbe { z, ..probe }, lv),
                probe.z,
                DZ_PROBE,
            ),
            dfdw: central_difference(
                |w| self.net_force(water, ForceProbe { w, ..probe }, lv),
                probe.w,
                DW_PROBE,
            ),
            dfdv: central_difference(
                |v| self.net_force(water, ForceProbe { v, ..probe }, lv),
                probe.v,
                DV_PROBE,
            ),
        }
    }

    /// Force envelope between `z_min` and `z_max` at rest.
    ///
    /// The upward bound is taken at `z_max` with the piston fully out, the
    /// downward one at `z_min` with it fully in. Without a piston both use
    /// the current added volume.
    pub fn compute_bounds(
        &self,
        water: &WaterColumn,
        z_min: f64,
        z_max: f64,
        lv: Option<f64>,
    ) -> FloatBounds {
        let lv = lv.unwrap_or_else(|| self.effective_lv());
        let (v_up, v_down) = match &self.piston {
            Some(piston) => (piston.vol_max(), piston.vol_min()),
            None => (self.v, self.v),
        };
        let f_max = self.net_force(
            water,
            ForceProbe {
                z: z_max,
                w: 0.0,
                v: v_up,
            },
            lv,
        );
        let f_min = self.net_force(
            water,
            ForceProbe {
                z: z_min,
                w: 0.0,
                v: v_down,
            },
            lv,
        );
        let f_abs_max = f_max.abs().max(f_min.abs());
        let w_max = (f_abs_max * lv / self.m).sqrt();

        info!(
            z_min,
            z_max,
            f_max_per_m = f_max / self.m,
            f_min_per_m = f_min / self.m,
            w_max_cm_s = w_max * 100.0,
            "acceleration and velocity bounds"
        );
        info!(
            up_cm_s = f_max / self.m * 60.0 * 100.0,
            down_cm_s = f_min / self.m * 60.0 * 100.0,
            "speed reached after one minute at the bounding accelerations"
        );

        FloatBounds {
            f_max,
            f_min,
            f_abs_max,
            w_max,
        }
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Float parameters:")?;
        writeln!(f, "  L     = {:.2} m      - float length", self.length)?;
        writeln!(f, "  a     = {:.2} m      - float radius", self.a)?;
        writeln!(f, "  m     = {:.2} kg     - float mass", self.m)?;
        writeln!(f, "  V     = {:.2e} cm^3   - float volume", self.hull_volume * 1e6)?;
        writeln!(f, "  gamma = {:.2e} /dbar  - mechanical compressibility", self.gamma)?;
        writeln!(f, "  alpha = {:.2e} /degC  - thermal compressibility", self.alpha)?;
        writeln!(f, "  temp0 = {:.2} degC   - reference temperature", self.temp0)?;
        if let Some(piston) = &self.piston {
            write!(f, "{piston}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_ocean::{LinearEos, UniformProfile};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn default_float() -> Float {
        Float::new(&FloatConfig::default()).unwrap()
    }

    fn uniform_water(rho0: f64) -> WaterColumn {
        WaterColumn::from_source(
            &UniformProfile::default(),
            0.0,
            45.0,
            Arc::new(LinearEos::uniform(rho0)),
        )
        .unwrap()
    }

    #[test]
    fn default_mass_matches_fresh_water() {
        let f = default_float();
        assert!((f.hull_volume() - PI * 0.05 * 0.05 * 0.4).abs() < 1e-15);
        assert!((f.mass() - 1000.0 * f.hull_volume()).abs() < 1e-12);
        assert!((f.density_at(0.0, 15.0, 0.0) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let cfg = FloatConfig {
            a: -0.05,
            ..FloatConfig::default()
        };
        assert!(matches!(Float::new(&cfg), Err(SimError::Config { .. })));
        let cfg = FloatConfig {
            m: Some(0.0),
            ..FloatConfig::default()
        };
        assert!(Float::new(&cfg).is_err());
    }

    #[test]
    fn density_query_needs_a_state() {
        let f = default_float();
        let err = f.density(&DensityQuery::default()).unwrap_err();
        assert!(matches!(err, SimError::Usage { .. }));
        let half = DensityQuery {
            p: Some(10.0),
            ..DensityQuery::default()
        };
        assert!(f.density(&half).is_err());
    }

    #[test]
    fn density_in_water_uses_local_state() {
        let f = default_float();
        let water = uniform_water(1025.0);
        let z = -200.0;
        let direct = f.density_at(water.get_p(z), water.get_temp(z), 0.0);
        let queried = f.density(&DensityQuery::in_water(z, &water)).unwrap();
        assert_eq!(direct, queried);
        // Compressed at depth.
        assert!(queried > f.density_at(0.0, 15.0, 0.0));
    }

    #[test]
    fn volume_is_total_volume() {
        let f = default_float();
        let vol = f.volume(&DensityQuery::at(0.0, 15.0).with_v(1e-5)).unwrap();
        assert!((vol - (f.hull_volume() + 1e-5)).abs() < 1e-15);
    }

    #[test]
    fn equilibrium_volume() {
        let f = default_float();
        let (p, temp, rho) = (500.0, 10.0, 1030.0);
        let v = f.volume_for_equilibrium(p, temp, rho).unwrap();
        assert!((f.density_at(p, temp, v) - rho).abs() < 1e-6);
        // Denser water needs less volume.
        assert!(v < 0.0);
    }

    #[test]
    fn mass_adjustment_reaches_equilibrium() {
        let mut f = default_float();
        let m0 = f.mass();
        let added = f.adjust_mass(100.0, 12.0, 1027.0).unwrap();
        assert!((f.density_at(100.0, 12.0, 0.0) - 1027.0).abs() < 1e-6);
        assert!((f.mass() - m0 - added).abs() < 1e-12);
        assert!(added > 0.0);
    }

    #[test]
    fn neutral_float_feels_no_force() {
        let f = default_float();
        let water = uniform_water(1000.0);
        let probe = ForceProbe {
            z: 0.0,
            w: 0.0,
            v: 0.0,
        };
        assert!(f.net_force(&water, probe, 0.4).abs() < 1e-9);
    }

    #[test]
    fn buoyancy_scales_with_configured_gravity() {
        let f = Float::new(&FloatConfig {
            gravity: 1.62,
            ..FloatConfig::default()
        })
        .unwrap();
        assert_eq!(to_mps2(f.gravity()), 1.62);
        let water = uniform_water(1025.0);
        let at_surface = ForceProbe {
            z: 0.0,
            w: 0.0,
            v: 0.0,
        };
        let rho_f = f.density_at(water.get_p(0.0), water.get_temp(0.0), 0.0);
        let expected = f.mass() * 1.62 * (water.get_rho(0.0, false) / rho_f - 1.0);
        assert!((f.net_force(&water, at_surface, 0.4) - expected).abs() < 1e-12);
    }

    #[test]
    fn drag_opposes_motion() {
        let f = default_float();
        let water = uniform_water(1000.0);
        let at = |w| f.net_force(&water, ForceProbe { z: 0.0, w, v: 0.0 }, 0.4);
        assert!(at(0.1) < at(0.0));
        assert!(at(-0.1) > at(0.0));
        // Quadratic: twice the speed, four times the drag.
        assert!(((at(0.2) - at(0.0)) / (at(0.1) - at(0.0)) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn gradients_have_physical_signs() {
        let f = default_float();
        let water = uniform_water(1025.0);
        let probe = ForceProbe {
            z: -100.0,
            w: 0.05,
            v: 0.0,
        };
        let g = f.force_gradients(&water, probe, 0.4);
        // Deeper, the float is squeezed and sinks harder.
        assert!(g.dfdz > 0.0);
        assert!(g.dfdw < 0.0);
        assert!(g.dfdv > 0.0);
        // dF/dv ~ m g rho_w / rho_f / (V + v)
        let expected = f.mass() * 9.81 / f.hull_volume() * 1.025;
        assert!((g.dfdv / expected - 1.0).abs() < 0.01, "{}", g.dfdv);
    }

    #[test]
    fn bounds_with_piston() {
        let f = default_float().with_piston(&PistonConfig::ensta()).unwrap();
        let water = uniform_water(1000.0);
        let b = f.compute_bounds(&water, -500.0, 0.0, None);
        assert!(b.f_max > 0.0);
        assert!(b.f_min < 0.0);
        assert_eq!(b.f_abs_max, b.f_max.abs().max(b.f_min.abs()));
        assert!((b.w_max - (b.f_abs_max * 0.4 / f.mass()).sqrt()).abs() < 1e-12);
        // Probing leaves the float untouched.
        assert_eq!((f.z(), f.w(), f.v()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn bounds_without_piston_use_current_volume() {
        let f = default_float();
        let water = uniform_water(1000.0);
        let b = f.compute_bounds(&water, -100.0, 0.0, Some(1.0));
        assert!(b.f_max.abs() < 1e-9);
        assert!(b.f_min < 0.0);
    }

    #[test]
    fn piston_volume_is_reachable() {
        let mut f = default_float().with_piston(&PistonConfig::ensta()).unwrap();
        f.set_v(1.0);
        let vol_max = f.piston().map(|p| p.vol_max()).unwrap();
        assert_eq!(f.v(), vol_max);
    }

    #[test]
    fn display_includes_piston() {
        let f = default_float().with_piston(&PistonConfig::ensta()).unwrap();
        let text = f.to_string();
        assert!(text.starts_with("Float parameters:"));
        assert!(text.contains("L     = 0.40 m"));
        assert!(text.contains("Piston parameters and state:"));
    }

    proptest! {
        #[test]
        fn density_positive_and_decreasing_in_volume(
            p in 0.0..2000.0f64,
            temp in -2.0..30.0f64,
            v in -1e-4..1e-4f64,
            dv in 1e-7..1e-4f64,
        ) {
            let f = default_float();
            let rho = f.density_at(p, temp, v);
            prop_assert!(rho > 0.0);
            prop_assert!(f.density_at(p, temp, v + dv) < rho);
        }
    }
}
