//! Scenario file format.
//!
//! A scenario describes one float, its water column and how to run it:
//!
//! ```yaml
//! float: { a: 0.05, length: 0.4 }
//! piston: { d_max: 0.07 }
//! water:
//!   lat: 30.0
//!   eos: { type: eos80 }
//!   profile: { type: tabulated, z: [0, -1000], temp: [20, 4], sp: [36, 35] }
//! ballast: { z: -100 }
//! control:
//!   controller: { d3y_gain: 0.001, tau: 30 }
//!   target: { type: constant, z: -50 }
//! run: { t_span: 3600, z: -40 }
//! ```

use crate::error::{CliError, CliResult};
use af_controls::{DepthController, TargetTrajectory};
use af_ocean::{Eos80, LinearEos, ProfileSource, SeawaterEos, TabulatedProfile, UniformProfile, WaterColumn};
use af_sim::{ControlLoop, Displacement, Float, FloatConfig, Isopycnal, PistonConfig, TimeStepOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub float: FloatConfig,
    #[serde(default)]
    pub piston: Option<PistonConfig>,
    pub water: WaterDef,
    /// Calibrate the mass to be neutral at this depth.
    #[serde(default)]
    pub ballast: Option<BallastDef>,
    #[serde(default)]
    pub control: Option<ControlDef>,
    #[serde(default)]
    pub isopycnal: Isopycnal,
    #[serde(default)]
    pub run: RunDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterDef {
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub eos: EosDef,
    pub profile: ProfileDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EosDef {
    #[default]
    Eos80,
    Linear(LinearEos),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileDef {
    Uniform(UniformProfile),
    Tabulated(TabulatedProfile),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallastDef {
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlDef {
    pub controller: DepthController,
    pub target: TargetTrajectory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDef {
    #[serde(alias = "T")]
    pub t_span: f64,
    pub dt_step: f64,
    pub dt_store: Option<f64>,
    pub t0: f64,
    pub z: Option<f64>,
    pub w: Option<f64>,
    pub v: Option<f64>,
    pub lv: Option<f64>,
}

impl Default for RunDef {
    fn default() -> Self {
        let opts = TimeStepOptions::default();
        Self {
            t_span: opts.t_span,
            dt_step: opts.dt_step,
            dt_store: opts.dt_store,
            t0: opts.t0,
            z: opts.z,
            w: opts.w,
            v: opts.v,
            lv: opts.lv,
        }
    }
}

impl Scenario {
    pub fn from_yaml(content: &str) -> CliResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let scenario = Self::from_yaml(&content)?;
        info!(path = %path.display(), "scenario loaded");
        Ok(scenario)
    }

    pub fn validate(&self) -> CliResult<()> {
        if let Some(control) = &self.control {
            control.controller.validate()?;
            if self.piston.is_none() {
                return Err(CliError::Scenario {
                    what: "control needs a piston".to_string(),
                });
            }
        }
        self.isopycnal.validate()?;
        Ok(())
    }

    pub fn build_water(&self) -> CliResult<WaterColumn> {
        let eos: Arc<dyn SeawaterEos> = match &self.water.eos {
            EosDef::Eos80 => Arc::new(Eos80::new()),
            EosDef::Linear(linear) => Arc::new(linear.clone()),
        };
        let source: &dyn ProfileSource = match &self.water.profile {
            ProfileDef::Uniform(uniform) => uniform,
            ProfileDef::Tabulated(table) => table,
        };
        Ok(WaterColumn::from_source(
            source,
            self.water.lon,
            self.water.lat,
            eos,
        )?)
    }

    /// Float with its piston, initial volume and ballast applied.
    pub fn build_float(&self, water: &WaterColumn) -> CliResult<Float> {
        let mut float = Float::new(&self.float)?;
        if let Some(piston) = &self.piston {
            float.init_piston(piston)?;
        }
        if let Some(v) = self.run.v {
            float.set_v(v);
        }
        if let Some(ballast) = &self.ballast {
            let z = ballast.z;
            float.adjust_mass(water.get_p(z), water.get_temp(z), water.get_rho(z, false))?;
        }
        Ok(float)
    }

    pub fn time_step_options(&self) -> TimeStepOptions {
        let control = self
            .control
            .as_ref()
            .map(|c| ControlLoop::new(c.controller.clone(), c.target.clone()));
        let eta = match &self.isopycnal {
            Isopycnal::None => None,
            wave => Some(Box::new(wave.clone()) as Box<dyn Displacement>),
        };
        TimeStepOptions {
            t_span: self.run.t_span,
            dt_step: self.run.dt_step,
            dt_store: self.run.dt_store,
            t0: self.run.t0,
            z: self.run.z,
            w: self.run.w,
            v: self.run.v,
            lv: self.run.lv,
            control,
            eta,
            log: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
water:
  profile: { type: uniform }
"#;

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario = Scenario::from_yaml(MINIMAL).unwrap();
        assert_eq!(scenario.float, FloatConfig::default());
        assert_eq!(scenario.run, RunDef::default());
        assert_eq!(scenario.water.eos, EosDef::Eos80);
        assert!(scenario.piston.is_none());
        let water = scenario.build_water().unwrap();
        assert!(scenario.build_float(&water).is_ok());
    }

    #[test]
    fn control_without_piston_is_rejected() {
        let yaml = r#"
water:
  profile: { type: uniform }
control:
  controller: { d3y_gain: 0.001 }
  target: { type: constant, z: -20 }
"#;
        assert!(matches!(
            Scenario::from_yaml(yaml),
            Err(CliError::Scenario { .. })
        ));
    }

    #[test]
    fn missing_gain_is_a_parse_error() {
        let yaml = r#"
water:
  profile: { type: uniform }
piston: { d_max: 0.07 }
control:
  controller: { tau: 30 }
  target: { type: constant, z: -20 }
"#;
        assert!(matches!(Scenario::from_yaml(yaml), Err(CliError::Yaml(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = "water:\n  profile: { type: uniform }\nfloats: {}\n";
        assert!(Scenario::from_yaml(yaml).is_err());
    }

    #[test]
    fn linear_eos_and_length_alias() {
        let yaml = r#"
float: { L: 0.8 }
water:
  eos: { type: linear, rho0: 1025.0 }
  profile: { type: tabulated, z: [0, -500], temp: [18, 8], sp: [36, 35] }
run: { T: 120, dt_store: null }
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.float.length, 0.8);
        assert_eq!(scenario.run.t_span, 120.0);
        assert_eq!(scenario.run.dt_store, None);
        match &scenario.water.eos {
            EosDef::Linear(eos) => {
                assert_eq!(eos.rho0, 1025.0);
                assert_eq!(eos.alpha, LinearEos::default().alpha);
            }
            other => panic!("unexpected eos {other:?}"),
        }
    }

    #[test]
    fn demo_scenarios_load_and_run_setup() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/scenarios");
        for name in ["neutral_surface.yaml", "hold_depth.yaml", "internal_wave.yaml"] {
            let scenario = Scenario::load(&root.join(name))
                .unwrap_or_else(|e| panic!("Failed to load {name}: {e}"));
            let water = scenario.build_water().unwrap();
            scenario
                .build_float(&water)
                .unwrap_or_else(|e| panic!("Failed to build float for {name}: {e}"));
        }
    }
}
