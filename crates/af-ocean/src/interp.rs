//! Piecewise-linear interpolation with linear extrapolation.

use crate::error::{OceanError, OceanResult};

/// Linear interpolant over a strictly monotonic grid.
///
/// Outside the grid the end segments are extended linearly; a query is never
/// rejected for being out of range.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearInterp {
    /// Grid, stored in ascending order.
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterp {
    /// Build an interpolant. The grid may be ascending or descending.
    pub fn new(x: &[f64], y: &[f64]) -> OceanResult<Self> {
        if x.len() != y.len() {
            return Err(OceanError::InvalidProfile {
                what: format!("grid has {} points but values have {}", x.len(), y.len()),
            });
        }
        if x.len() < 2 {
            return Err(OceanError::InvalidProfile {
                what: "at least two levels are required".to_string(),
            });
        }

        let mut x = x.to_vec();
        let mut y = y.to_vec();
        if x[1] < x[0] {
            x.reverse();
            y.reverse();
        }
        if let Some(i) = x.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(OceanError::InvalidProfile {
                what: format!("grid is not strictly monotonic at index {}", i + 1),
            });
        }

        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Evaluate at `xq`.
    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        // Segment whose left node is the last grid point <= xq, clamped so the
        // first and last segments also serve extrapolation.
        let i = self
            .x
            .partition_point(|&xi| xi <= xq)
            .saturating_sub(1)
            .min(n - 2);

        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        y0 + (xq - x0) * (y1 - y0) / (x1 - x0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> LinearInterp {
        // Depth grid from the surface downward, as profile sources supply it.
        LinearInterp::new(&[0.0, -10.0, -30.0], &[20.0, 18.0, 10.0]).unwrap()
    }

    #[test]
    fn hits_grid_points() {
        let f = column();
        assert_eq!(f.eval(0.0), 20.0);
        assert_eq!(f.eval(-10.0), 18.0);
        assert_eq!(f.eval(-30.0), 10.0);
    }

    #[test]
    fn interpolates_inside() {
        let f = column();
        assert!((f.eval(-5.0) - 19.0).abs() < 1e-12);
        assert!((f.eval(-20.0) - 14.0).abs() < 1e-12);
    }

    #[test]
    fn extrapolates_both_ends() {
        let f = column();
        // Above the surface: slope of the top segment (0.2 per metre).
        assert!((f.eval(5.0) - 21.0).abs() < 1e-12);
        // Below the bottom: slope of the deepest segment (0.4 per metre).
        assert!((f.eval(-40.0) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(LinearInterp::new(&[0.0], &[1.0]).is_err());
        assert!(LinearInterp::new(&[0.0, 1.0], &[1.0]).is_err());
        assert!(LinearInterp::new(&[0.0, -1.0, -1.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(LinearInterp::new(&[0.0, -1.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(LinearInterp::new(&[0.0, f64::NAN], &[1.0, 2.0]).is_err());
    }
}
