//! Vertical dynamics of a buoyancy-driven float.
//!
//! Provides:
//! - Float force and density model with equilibrium calibration
//! - Screw piston actuator with travel and rate limits
//! - Forward Euler time stepping with optional depth control
//! - Isopycnal displacement forcing of the water column

pub mod error;
pub mod float;
pub mod forcing;
pub mod piston;
pub mod sim;

pub use error::{SimError, SimResult};
pub use float::{DensityQuery, Float, FloatBounds, FloatConfig, ForceProbe};
pub use forcing::{Displacement, Isopycnal};
pub use piston::{Piston, PistonConfig};
pub use sim::{ControlLoop, RunSummary, TimeStepOptions};
