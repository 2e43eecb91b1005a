use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Three-way sign: -1, 0 or +1.
///
/// Unlike `f64::signum`, zero maps to zero. NaN maps to zero as well.
pub fn sign(v: Real) -> Real {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Symmetric difference quotient `(f(x + h) - f(x - h)) / (2h)`.
pub fn central_difference<F>(f: F, x: Real, h: Real) -> Real
where
    F: Fn(Real) -> Real,
{
    (f(x + h) - f(x - h)) / (2.0 * h)
}
