//! Nonlinear root finding for float calibration.
//!
//! Damped Newton iteration on `nalgebra` vectors with a backtracking line
//! search and central-difference Jacobians. The float model uses the scalar
//! wrapper to find the added volume or mass that puts the float at
//! equilibrium with a prescribed water density.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod scalar;

pub use error::{SolverError, SolverResult};
pub use jacobian::central_difference_jacobian;
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use scalar::{ScalarRoot, solve_scalar};
