//! Explicit time stepping of the float's vertical motion.

use crate::error::{SimError, SimResult};
use crate::float::{DensityQuery, Float, ForceProbe};
use crate::forcing::Displacement;
use af_controls::{DepthController, DepthTrajectory, PlantState, SampleConfig, TargetKinematics};
use af_ocean::WaterColumn;
use af_results::TrajectorySample;
use serde::Serialize;
use tracing::{debug, info};

/// Depth span of the float volume difference fed to the controller (m).
const DVDZ_SPAN: f64 = 0.5;

/// Closed-loop depth tracking.
pub struct ControlLoop {
    pub controller: DepthController,
    pub target: Box<dyn DepthTrajectory>,
}

impl ControlLoop {
    pub fn new(controller: DepthController, target: impl DepthTrajectory + 'static) -> Self {
        Self {
            controller,
            target: Box::new(target),
        }
    }
}

/// Options for [`Float::time_step`].
pub struct TimeStepOptions {
    /// Duration (s)
    pub t_span: f64,
    /// Integration step (s)
    pub dt_step: f64,
    /// Logging period (s); `None` stores nothing
    pub dt_store: Option<f64>,
    /// Start time (s)
    pub t0: f64,
    /// Initial depth; `None` keeps the current one
    pub z: Option<f64>,
    /// Initial velocity; `None` keeps the current one
    pub w: Option<f64>,
    /// Initial added volume; `None` keeps the current one
    pub v: Option<f64>,
    /// Drag length (m); `None` uses the float length
    pub lv: Option<f64>,
    /// Piston control; `None` leaves the piston where it is
    pub control: Option<ControlLoop>,
    /// Isopycnal displacement; `None` keeps the water column at rest
    pub eta: Option<Box<dyn Displacement>>,
    /// Start a new trajectory log
    pub log: bool,
}

impl Default for TimeStepOptions {
    fn default() -> Self {
        Self {
            t_span: 600.0,
            dt_step: 1.0,
            dt_store: Some(60.0),
            t0: 0.0,
            z: None,
            w: None,
            v: None,
            lv: None,
            control: None,
            eta: None,
            log: true,
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: usize,
    /// Time after the last step (s)
    pub t_end: f64,
    pub z: f64,
    pub w: f64,
    pub v: f64,
    /// Steps on which the controller moved the piston
    pub control_updates: usize,
    pub samples_stored: usize,
}

impl Float {
    /// Integrate the float's motion with forward Euler.
    ///
    /// Each step sets the isopycnal displacement, evaluates the net force,
    /// lets the controller act on the piston, logs, then advances depth and
    /// velocity with the force from the start of the step. Depth is capped
    /// at the surface.
    pub fn time_step(&mut self, water: &mut WaterColumn, opts: &TimeStepOptions) -> SimResult<RunSummary> {
        if !(opts.dt_step > 0.0 && opts.dt_step.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "dt_step must be positive",
            });
        }
        if !(opts.t_span >= 0.0 && opts.t_span.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "duration must be non-negative",
            });
        }
        let store = opts.dt_store.map(SampleConfig::new).transpose()?;
        if let Some(control) = &opts.control {
            control.controller.validate()?;
            if self.piston().is_none() {
                return Err(SimError::Usage {
                    what: "depth control needs a piston",
                });
            }
        }

        if let Some(z) = opts.z {
            self.set_z(z);
        }
        if let Some(w) = opts.w {
            self.set_w(w);
        }
        if opts.control.is_some() {
            if let Some(v) = opts.v {
                self.set_v(v);
            } else if let Some(vol) = self.piston().map(|p| p.vol()) {
                self.set_state_unchecked(self.z(), self.w(), vol);
            }
        } else if let Some(v) = opts.v {
            self.set_state_unchecked(self.z(), self.w(), v);
        }
        let lv = opts.lv.unwrap_or(self.length());
        if !(lv > 0.0 && lv.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "drag length must be positive",
            });
        }
        self.set_lv(lv);
        self.reset_log(opts.log);

        info!(
            minutes = opts.t_span / 60.0,
            dt_step = opts.dt_step,
            z = self.z(),
            control = opts.control.is_some(),
            "start time stepping"
        );

        let dt = opts.dt_step;
        let mut t = opts.t0;
        let mut steps = 0;
        let mut control_updates = 0;
        let mut samples_stored = 0;

        while t < opts.t0 + opts.t_span {
            water.eta = opts.eta.as_ref().map_or(0.0, |eta| eta.displacement(t));

            let force = self.net_force(water, ForceProbe::from_float(self), lv);
            if !force.is_finite() {
                return Err(SimError::NonPhysical {
                    what: format!("net force {force} at t = {t}, z = {}", self.z()),
                });
            }
            let accel = force / self.mass();

            if let Some(control) = &opts.control {
                let target = TargetKinematics::sample(control.target.as_ref(), t);
                if control.controller.is_active(self.z(), target.depth) {
                    let rate = self.control_rate(water, &control.controller, &target, accel, lv)?;
                    let piston = self.piston_mut().ok_or(SimError::Usage {
                        what: "depth control needs a piston",
                    })?;
                    piston.update(dt, rate);
                    let vol = piston.vol();
                    self.set_state_unchecked(self.z(), self.w(), vol);
                    control_updates += 1;
                }
            }

            if store.is_some_and(|store| store.is_due(t, dt)) {
                let sample = TrajectorySample {
                    t,
                    z: self.z(),
                    w: self.w(),
                    v: self.v(),
                    dwdt: accel,
                };
                if let Some(log) = self.log_mut() {
                    log.store(sample);
                    samples_stored += 1;
                }
            }

            let z = (self.z() + dt * self.w()).min(0.0);
            let w = self.w() + dt * accel;
            self.set_state_unchecked(z, w, self.v());
            t += dt;
            steps += 1;
        }

        info!(
            steps,
            z = self.z(),
            w = self.w(),
            control_updates,
            "time stepping done"
        );

        Ok(RunSummary {
            steps,
            t_end: t,
            z: self.z(),
            w: self.w(),
            v: self.v(),
            control_updates,
            samples_stored,
        })
    }

    fn control_rate(
        &self,
        water: &WaterColumn,
        controller: &DepthController,
        target: &TargetKinematics,
        accel: f64,
        lv: f64,
    ) -> SimResult<f64> {
        let z = self.z();
        let dvdz = self.volume(&DensityQuery::in_water(z + DVDZ_SPAN, water))?
            - self.volume(&DensityQuery::in_water(z - DVDZ_SPAN, water))?;
        let gradients = self.force_gradients(water, ForceProbe::from_float(self), lv);
        let plant = PlantState {
            z,
            w: self.w(),
            accel,
            dvdz,
            mass: self.mass(),
        };
        let rate = controller.volume_rate(&plant, target, &gradients)?;
        debug!(
            z,
            z_target = target.depth,
            dfdz = gradients.dfdz,
            dfdw = gradients.dfdw,
            dfdv = gradients.dfdv,
            rate,
            "control update"
        );
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::FloatConfig;
    use crate::piston::PistonConfig;
    use af_ocean::{LinearEos, UniformProfile};
    use std::sync::Arc;

    fn water() -> WaterColumn {
        WaterColumn::from_source(
            &UniformProfile::default(),
            0.0,
            45.0,
            Arc::new(LinearEos::uniform(1000.0)),
        )
        .unwrap()
    }

    #[test]
    fn time_step_options_defaults() {
        let opts = TimeStepOptions::default();
        assert_eq!(opts.t_span, 600.0);
        assert_eq!(opts.dt_step, 1.0);
        assert_eq!(opts.dt_store, Some(60.0));
        assert!(opts.log);
        assert!(opts.control.is_none());
    }

    #[test]
    fn invalid_step_is_rejected() {
        let mut f = Float::new(&FloatConfig::default()).unwrap();
        let opts = TimeStepOptions {
            dt_step: 0.0,
            ..TimeStepOptions::default()
        };
        assert!(matches!(
            f.time_step(&mut water(), &opts),
            Err(SimError::InvalidArg { .. })
        ));
        let opts = TimeStepOptions {
            t_span: -1.0,
            ..TimeStepOptions::default()
        };
        assert!(f.time_step(&mut water(), &opts).is_err());
    }

    #[test]
    fn control_without_piston_is_a_usage_error() {
        let mut f = Float::new(&FloatConfig::default()).unwrap();
        let opts = TimeStepOptions {
            control: Some(ControlLoop::new(
                DepthController::new(1e-4).unwrap(),
                |_t: f64| -10.0,
            )),
            ..TimeStepOptions::default()
        };
        assert!(matches!(
            f.time_step(&mut water(), &opts),
            Err(SimError::Usage { .. })
        ));
    }

    #[test]
    fn zero_duration_takes_no_step() {
        let mut f = Float::new(&FloatConfig::default()).unwrap();
        let opts = TimeStepOptions {
            t_span: 0.0,
            z: Some(-5.0),
            ..TimeStepOptions::default()
        };
        let summary = f.time_step(&mut water(), &opts).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.z, -5.0);
        assert_eq!(f.log().map(|l| l.len()), Some(0));
    }

    #[test]
    fn initial_volume_goes_through_the_piston() {
        let mut f = Float::new(&FloatConfig::default())
            .unwrap()
            .with_piston(&PistonConfig::ensta())
            .unwrap();
        let opts = TimeStepOptions {
            t_span: 0.0,
            v: Some(1.0),
            control: Some(ControlLoop::new(
                DepthController::new(1e-4).unwrap(),
                |_t: f64| -10.0,
            )),
            ..TimeStepOptions::default()
        };
        f.time_step(&mut water(), &opts).unwrap();
        let vol_max = f.piston().map(|p| p.vol_max()).unwrap();
        assert_eq!(f.v(), vol_max);
    }

    #[test]
    fn unlogged_runs_keep_no_log() {
        let mut f = Float::new(&FloatConfig::default()).unwrap();
        let opts = TimeStepOptions {
            t_span: 10.0,
            log: false,
            ..TimeStepOptions::default()
        };
        let summary = f.time_step(&mut water(), &opts).unwrap();
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.samples_stored, 0);
        assert!(f.log().is_none());
    }
}
