//! Equation-of-state oracle for seawater.
//!
//! The water column only needs density and conversions between temperature
//! representations. Any oceanographic equation of state can stand behind the
//! [`SeawaterEos`] trait; two are shipped here:
//!
//! - [`Eos80`]: UNESCO EOS-80 density with the secant bulk modulus for
//!   pressure effects. Conservative, potential and in-situ temperature are
//!   treated as interchangeable, which is accurate to a few hundredths of a
//!   degree over the upper ocean.
//! - [`LinearEos`]: linear sensitivities around a reference state, for
//!   controlled experiments.
//!
//! # Units
//!
//! - Temperature: °C
//! - Absolute salinity: g/kg, practical salinity: PSU
//! - Pressure: dbar (sea pressure, zero at the surface)
//! - Density: kg/m³

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Ratio between absolute salinity of standard seawater and its practical salinity.
pub const SA_PER_SP: f64 = 35.165_04 / 35.0;

/// Seawater equation-of-state oracle.
///
/// Implementations must be pure functions of their arguments.
pub trait SeawaterEos: Send + Sync + Debug {
    /// Model name (for logging).
    fn name(&self) -> &str;

    /// In-situ density from absolute salinity, conservative temperature and pressure.
    fn rho(&self, sa: f64, ct: f64, p: f64) -> f64;

    /// In-situ temperature from absolute salinity, conservative temperature and pressure.
    fn t_from_ct(&self, sa: f64, ct: f64, p: f64) -> f64;

    /// Potential temperature (referenced to the surface) from conservative temperature.
    fn pt_from_ct(&self, sa: f64, ct: f64) -> f64;

    /// Conservative temperature from in-situ temperature.
    fn ct_from_t(&self, sa: f64, t: f64, p: f64) -> f64;

    /// Absolute salinity from practical salinity.
    ///
    /// The default ignores the geographic anomaly and scales by the reference
    /// composition ratio.
    fn sa_from_sp(&self, sp: f64, _p: f64, _lon: f64, _lat: f64) -> f64 {
        sp * SA_PER_SP
    }
}

/// UNESCO EOS-80 seawater density.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Eos80;

impl Eos80 {
    pub fn new() -> Self {
        Self
    }

    /// One-atmosphere density from practical salinity and temperature.
    pub fn density_surface(&self, sp: f64, t: f64) -> f64 {
        // Pure water density (Bigg formula)
        let rho_w = 999.842594 + 6.793952e-2 * t - 9.095290e-3 * t.powi(2)
            + 1.001685e-4 * t.powi(3)
            - 1.120083e-6 * t.powi(4)
            + 6.536336e-9 * t.powi(5);

        let a = 8.24493e-1 - 4.0899e-3 * t + 7.6438e-5 * t.powi(2) - 8.2467e-7 * t.powi(3)
            + 5.3875e-9 * t.powi(4);
        let b = -5.72466e-3 + 1.0227e-4 * t - 1.6546e-6 * t.powi(2);
        let c = 4.8314e-4;

        let sp = sp.max(0.0);
        rho_w + a * sp + b * sp.powf(1.5) + c * sp * sp
    }

    /// Secant bulk modulus in bar, with pressure `p_bar` in bar.
    fn secant_bulk_modulus(&self, sp: f64, t: f64, p_bar: f64) -> f64 {
        let sp = sp.max(0.0);
        let kw = 19652.21 + 148.4206 * t - 2.327105 * t.powi(2) + 1.360477e-2 * t.powi(3)
            - 5.155288e-5 * t.powi(4);
        let k0 = kw
            + sp * (54.6746 - 0.603459 * t + 1.09987e-2 * t.powi(2) - 6.1670e-5 * t.powi(3))
            + sp.powf(1.5) * (7.944e-2 + 1.6483e-2 * t - 5.3009e-4 * t.powi(2));

        let aw = 3.239908 + 1.43713e-3 * t + 1.16092e-4 * t.powi(2) - 5.77905e-7 * t.powi(3);
        let a = aw
            + sp * (2.2838e-3 - 1.0981e-5 * t - 1.6078e-6 * t.powi(2))
            + sp.powf(1.5) * 1.91075e-4;

        let bw = 8.50935e-5 - 6.12293e-6 * t + 5.2787e-8 * t.powi(2);
        let b = bw + sp * (-9.9348e-7 + 2.0816e-8 * t + 9.1697e-10 * t.powi(2));

        k0 + p_bar * (a + b * p_bar)
    }
}

impl SeawaterEos for Eos80 {
    fn name(&self) -> &str {
        "EOS-80"
    }

    fn rho(&self, sa: f64, ct: f64, p: f64) -> f64 {
        let sp = sa / SA_PER_SP;
        let rho0 = self.density_surface(sp, ct);
        if p.abs() < 1e-9 {
            return rho0;
        }
        let p_bar = p / 10.0;
        rho0 / (1.0 - p_bar / self.secant_bulk_modulus(sp, ct, p_bar))
    }

    fn t_from_ct(&self, _sa: f64, ct: f64, _p: f64) -> f64 {
        ct
    }

    fn pt_from_ct(&self, _sa: f64, ct: f64) -> f64 {
        ct
    }

    fn ct_from_t(&self, _sa: f64, t: f64, _p: f64) -> f64 {
        t
    }
}

/// Linearised equation of state.
///
/// ```text
/// rho = rho0 * (1 - alpha (CT - ct0) + beta (SA - sa0) + kappa p)
/// ```
///
/// Temperatures are treated as interchangeable. Setting every coefficient to
/// zero gives a homogeneous, incompressible ocean of density `rho0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearEos {
    /// Reference density (kg/m³)
    pub rho0: f64,
    /// Reference conservative temperature (°C)
    pub ct0: f64,
    /// Reference absolute salinity (g/kg)
    pub sa0: f64,
    /// Thermal expansion coefficient (1/°C)
    pub alpha: f64,
    /// Haline contraction coefficient (kg/g)
    pub beta: f64,
    /// Compressibility (1/dbar)
    pub kappa: f64,
}

impl Default for LinearEos {
    fn default() -> Self {
        Self {
            rho0: 1027.0,
            ct0: 10.0,
            sa0: 35.0,
            alpha: 1.7e-4,
            beta: 7.6e-4,
            kappa: 4.4e-6,
        }
    }
}

impl LinearEos {
    /// Homogeneous ocean of constant density.
    pub fn uniform(rho0: f64) -> Self {
        Self {
            rho0,
            ct0: 0.0,
            sa0: 0.0,
            alpha: 0.0,
            beta: 0.0,
            kappa: 0.0,
        }
    }
}

impl SeawaterEos for LinearEos {
    fn name(&self) -> &str {
        "linear"
    }

    fn rho(&self, sa: f64, ct: f64, p: f64) -> f64 {
        self.rho0
            * (1.0 - self.alpha * (ct - self.ct0) + self.beta * (sa - self.sa0) + self.kappa * p)
    }

    fn t_from_ct(&self, _sa: f64, ct: f64, _p: f64) -> f64 {
        ct
    }

    fn pt_from_ct(&self, _sa: f64, ct: f64) -> f64 {
        ct
    }

    fn ct_from_t(&self, _sa: f64, t: f64, _p: f64) -> f64 {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 0.1;

    #[test]
    fn pure_water_density() {
        let eos = Eos80::new();
        assert!((eos.density_surface(0.0, 4.0) - 1000.0).abs() < TOL);
        assert!((eos.density_surface(0.0, 20.0) - 998.2).abs() < TOL);
    }

    #[test]
    fn standard_seawater_density() {
        let eos = Eos80::new();
        let sa = 35.0 * SA_PER_SP;
        assert!((eos.rho(sa, 10.0, 0.0) - 1026.97).abs() < TOL);
        assert!((eos.rho(sa, 0.0, 0.0) - 1028.1).abs() < TOL);
    }

    #[test]
    fn density_increases_with_pressure() {
        let eos = Eos80::new();
        let sa = 35.0 * SA_PER_SP;
        let surface = eos.rho(sa, 10.0, 0.0);
        let deep = eos.rho(sa, 10.0, 1000.0);
        // Roughly 4.5 kg/m³ per 1000 dbar in the upper ocean.
        assert!(deep > surface + 3.5 && deep < surface + 5.5);
    }

    #[test]
    fn warm_water_is_lighter() {
        let eos = Eos80::new();
        assert!(eos.rho(35.0, 5.0, 0.0) > eos.rho(35.0, 15.0, 0.0));
    }

    #[test]
    fn linear_eos_reference_state() {
        let eos = LinearEos::default();
        assert!((eos.rho(eos.sa0, eos.ct0, 0.0) - eos.rho0).abs() < 1e-12);
        assert!(eos.rho(eos.sa0, eos.ct0 + 1.0, 0.0) < eos.rho0);
        assert!(eos.rho(eos.sa0, eos.ct0, 100.0) > eos.rho0);
    }

    #[test]
    fn uniform_eos_ignores_state() {
        let eos = LinearEos::uniform(1000.0);
        assert_eq!(eos.rho(30.0, 2.0, 500.0), 1000.0);
        assert_eq!(eos.t_from_ct(30.0, 2.0, 500.0), 2.0);
    }

    #[test]
    fn default_absolute_salinity_scaling() {
        let eos = Eos80::new();
        assert!((eos.sa_from_sp(35.0, 0.0, 0.0, 0.0) - 35.16504).abs() < 1e-10);
    }
}
