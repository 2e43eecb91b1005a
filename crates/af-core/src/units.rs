// af-core/src/units.rs

use uom::si::f64::{Acceleration as UomAcceleration, AngularVelocity as UomAngularVelocity};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type AngularVelocity = UomAngularVelocity;

#[inline]
pub fn mps2(v: f64) -> Accel {
    use uom::si::acceleration::meter_per_second_squared;
    Accel::new::<meter_per_second_squared>(v)
}

#[inline]
pub fn to_mps2(a: Accel) -> f64 {
    use uom::si::acceleration::meter_per_second_squared;
    a.get::<meter_per_second_squared>()
}

/// Rotation rate given in revolutions per minute.
#[inline]
pub fn rpm(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::revolution_per_minute;
    AngularVelocity::new::<revolution_per_minute>(v)
}

/// Value of an angular velocity in degrees per second.
#[inline]
pub fn deg_per_s(omega: AngularVelocity) -> f64 {
    use uom::si::angular_velocity::degree_per_second;
    omega.get::<degree_per_second>()
}

/// Wrap a raw rotation rate in rad/s.
#[inline]
pub fn radps(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::radian_per_second;
    AngularVelocity::new::<radian_per_second>(v)
}

#[inline]
pub fn to_radps(omega: AngularVelocity) -> f64 {
    use uom::si::angular_velocity::radian_per_second;
    omega.get::<radian_per_second>()
}

pub mod constants {
    /// Gravitational acceleration used by the float dynamics.
    pub const G_MPS2: f64 = 9.81;
}
