//! Finite difference Jacobians.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Perturbation used for column `j`: relative to `|x[j]|`, never below `epsilon`.
fn perturbation(x: f64, epsilon: f64) -> f64 {
    epsilon * x.abs().max(1.0)
}

fn ensure_finite_column(df: &DVector<f64>, column: usize) -> SolverResult<()> {
    if df.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SolverError::Numeric {
            what: format!("non-finite Jacobian column {column}"),
        })
    }
}

/// Central-difference Jacobian (second order, two evaluations per column).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let m = f(x)?.len();
    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let dx = perturbation(x[j], epsilon);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let mut x_minus = x.clone();
        x_minus[j] -= dx;

        let df = (f(&x_plus)? - f(&x_minus)?) / (2.0 * dx);
        ensure_finite_column(&df, j)?;
        jac.set_column(j, &df);
    }

    Ok(jac)
}
