//! Damped Newton iteration.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Newton solver configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    /// Absolute tolerance on the residual norm
    pub abs_tol: f64,
    /// Tolerance on the residual norm relative to the initial one
    pub rel_tol: f64,
    /// Step shrink factor of the line search
    pub line_search_beta: f64,
    /// Sufficient decrease constant of the line search (Armijo)
    pub armijo_c: f64,
    pub max_line_search_iters: usize,
    /// Damping below which the iteration is declared stalled
    pub min_step: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-10,
            rel_tol: 1e-12,
            line_search_beta: 0.5,
            armijo_c: 1e-4,
            max_line_search_iters: 20,
            min_step: 1e-10,
        }
    }
}

impl NewtonConfig {
    fn is_converged(&self, r_norm: f64, r0_norm: f64) -> bool {
        r_norm < self.abs_tol || r_norm < self.rel_tol * r0_norm
    }
}

/// Converged Newton iterate.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    /// Damping of the last accepted step (1 for a full Newton step)
    pub last_step: f64,
}

fn finite_norm(r: &DVector<f64>, x: &DVector<f64>) -> SolverResult<f64> {
    let norm = r.norm();
    if norm.is_finite() {
        Ok(norm)
    } else {
        Err(SolverError::Numeric {
            what: format!("residual is not finite at x = {}", x.transpose()),
        })
    }
}

/// Solve `residual(x) = 0` from `x0`.
///
/// Each Newton direction is shortened by `line_search_beta` until the
/// residual norm decreases by the Armijo factor `1 - armijo_c * step`. A
/// residual that stops decreasing is reported as a failure instead of
/// returning the last iterate.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = finite_norm(&r, &x)?;
    let r0_norm = r_norm;
    let mut last_step = 1.0;

    for iter in 0..=config.max_iterations {
        if config.is_converged(r_norm, r0_norm) {
            debug!(iter, residual = r_norm, "newton converged");
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                last_step,
            });
        }
        if iter == config.max_iterations {
            break;
        }

        let dx = jacobian_fn(&x)?
            .lu()
            .solve(&-&r)
            .ok_or_else(|| SolverError::Numeric {
                what: format!("singular Jacobian at iteration {iter}"),
            })?;

        let mut step = 1.0;
        let mut accepted = None;
        for _ in 0..=config.max_line_search_iters {
            let x_trial = &x + step * &dx;
            let r_trial = residual_fn(&x_trial)?;
            let norm = r_trial.norm();
            if norm.is_finite() && norm <= (1.0 - config.armijo_c * step) * r_norm {
                accepted = Some((x_trial, r_trial, norm));
                break;
            }
            step *= config.line_search_beta;
            if step < config.min_step {
                break;
            }
        }
        let Some((x_new, r_new, r_new_norm)) = accepted else {
            return Err(SolverError::ConvergenceFailed {
                what: format!("line search stalled at iteration {iter}, residual = {r_norm}"),
            });
        };

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
        last_step = step;
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "no convergence in {} iterations, residual = {r_norm}",
            config.max_iterations
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(f: impl Fn(f64) -> f64) -> impl Fn(&DVector<f64>) -> SolverResult<DVector<f64>> {
        move |x| Ok(DVector::from_element(1, f(x[0])))
    }

    #[test]
    fn simple_quadratic() {
        let residual = scalar(|x| x * x - 4.0);
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let result = newton_solve(DVector::from_element(1, 3.0), residual, jacobian, &NewtonConfig::default())
            .unwrap();
        assert!((result.x[0] - 2.0).abs() < 1e-9);
        assert_eq!(result.last_step, 1.0);
    }

    #[test]
    fn damping_tames_an_overshooting_step() {
        // A full Newton step on atan from x = 2 lands further out than it started.
        let residual = scalar(f64::atan);
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 1.0 / (1.0 + x[0] * x[0])))
        };

        let result = newton_solve(DVector::from_element(1, 2.0), residual, jacobian, &NewtonConfig::default())
            .unwrap();
        assert!(result.x[0].abs() < 1e-9);
    }

    #[test]
    fn coupled_system() {
        // x + y = 3, x * y = 2 with the root (1, 2) next to the start point.
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] + x[1] - 3.0, x[0] * x[1] - 2.0]))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, x[1], x[0]]))
        };

        let x0 = DVector::from_vec(vec![0.8, 2.5]);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();
        assert!((result.x[0] - 1.0).abs() < 1e-8);
        assert!((result.x[1] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn no_root_reports_failure() {
        // x^2 + 1 has no real root; Newton must not claim success.
        let residual = scalar(|x| x * x + 1.0);
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let result = newton_solve(DVector::from_element(1, 0.5), residual, jacobian, &NewtonConfig::default());
        assert!(matches!(result, Err(SolverError::ConvergenceFailed { .. }) | Err(SolverError::Numeric { .. })));
    }
}
