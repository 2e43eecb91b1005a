//! Depth-tracking control for buoyancy-driven floats.
//!
//! The controller turns the error between the float and a prescribed depth
//! trajectory into a piston volume-rate command. It knows nothing about the
//! float itself: the plant enters only through its current kinematics and
//! the net-force gradients the caller estimates.
//!
//! # Architecture
//!
//! - [`DepthTrajectory`]: the target `z_target(t)`, any `Fn(f64) -> f64` or a
//!   configurable [`TargetTrajectory`]
//! - [`TargetKinematics`]: target depth, velocity and acceleration sampled by
//!   central differences
//! - [`DepthController`]: third-derivative switching law with a chatter
//!   deadband
//! - [`SampleConfig`] and [`t_modulo_dt`]: sample-time test for fixed-step
//!   loops, used for the logging cadence

pub mod controller;
pub mod error;
pub mod sampled;
pub mod trajectory;

pub use controller::{DepthController, ForceGradients, PlantState, TargetKinematics};
pub use error::{ControlError, ControlResult};
pub use sampled::{SampleConfig, t_modulo_dt};
pub use trajectory::{DepthTrajectory, TargetTrajectory};
