//! One-dimensional root finding on top of the vector Newton solver.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::central_difference_jacobian;
use crate::newton::{NewtonConfig, newton_solve};
use nalgebra::DVector;

/// Relative perturbation for the numerical derivative.
const DERIVATIVE_EPSILON: f64 = 1e-8;

/// Outcome of a scalar solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarRoot {
    pub x: f64,
    pub residual: f64,
    pub iterations: usize,
}

/// Find `x` with `f(x) = 0` starting from `x0`.
///
/// The derivative is estimated by central differences. A solve that stops
/// without meeting the tolerances is an error, never a best-effort value.
pub fn solve_scalar<F>(f: F, x0: f64, config: &NewtonConfig) -> SolverResult<ScalarRoot>
where
    F: Fn(f64) -> f64,
{
    let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
        let r = f(x[0]);
        if r.is_finite() {
            Ok(DVector::from_element(1, r))
        } else {
            Err(SolverError::Numeric {
                what: format!("residual is not finite at x = {}", x[0]),
            })
        }
    };
    let jacobian = |x: &DVector<f64>| central_difference_jacobian(x, residual, DERIVATIVE_EPSILON);

    let result = newton_solve(DVector::from_element(1, x0), residual, jacobian, config)?;

    Ok(ScalarRoot {
        x: result.x[0],
        residual: f(result.x[0]),
        iterations: result.iterations,
    })
}
