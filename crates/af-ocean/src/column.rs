//! Water column: interpolated hydrography at arbitrary depth.

use crate::eos::SeawaterEos;
use crate::error::OceanResult;
use crate::interp::LinearInterp;
use crate::profile::{Profile, ProfileSource};
use std::sync::Arc;
use tracing::info;

/// Hydrographic profile with depth lookups and an isopycnal displacement.
///
/// Salinity and temperature are sampled at the displaced depth `z - eta`;
/// pressure is always sampled at `z`. Queries outside the grid extrapolate
/// linearly and never fail.
#[derive(Clone, Debug)]
pub struct WaterColumn {
    lon: f64,
    lat: f64,
    z: Vec<f64>,
    p: LinearInterp,
    temp: LinearInterp,
    sa: LinearInterp,
    ct: LinearInterp,
    sp: LinearInterp,
    /// Conservative temperature at the shallowest level.
    ct_surface: f64,
    eos: Arc<dyn SeawaterEos>,
    /// Isopycnal displacement (m), positive upward.
    pub eta: f64,
}

impl WaterColumn {
    /// Build from an already assembled profile.
    pub fn new(profile: Profile, eos: Arc<dyn SeawaterEos>) -> OceanResult<Self> {
        profile.validate()?;

        let surface = profile
            .z
            .iter()
            .enumerate()
            .fold(0, |best, (i, &z)| if z > profile.z[best] { i } else { best });

        Ok(Self {
            lon: profile.lon,
            lat: profile.lat,
            p: LinearInterp::new(&profile.z, &profile.p)?,
            temp: LinearInterp::new(&profile.z, &profile.temp)?,
            sa: LinearInterp::new(&profile.z, &profile.sa)?,
            ct: LinearInterp::new(&profile.z, &profile.ct)?,
            sp: LinearInterp::new(&profile.z, &profile.sp)?,
            ct_surface: profile.ct[surface],
            z: profile.z,
            eos,
            eta: 0.0,
        })
    }

    /// Query `source` once at `(lon, lat)` and build the column.
    pub fn from_source(
        source: &dyn ProfileSource,
        lon: f64,
        lat: f64,
        eos: Arc<dyn SeawaterEos>,
    ) -> OceanResult<Self> {
        let profile = source.profile(lon, lat, eos.as_ref())?;
        info!(
            lon,
            lat,
            levels = profile.len(),
            eos = eos.name(),
            "water column loaded"
        );
        Self::new(profile, eos)
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Depth grid in source order.
    pub fn depths(&self) -> &[f64] {
        &self.z
    }

    pub fn eos(&self) -> &dyn SeawaterEos {
        self.eos.as_ref()
    }

    /// Conservative temperature at the shallowest grid level.
    pub fn surface_ct(&self) -> f64 {
        self.ct_surface
    }

    fn shifted(&self, z: f64) -> f64 {
        z - self.eta
    }

    /// Sea pressure (dbar).
    pub fn get_p(&self, z: f64) -> f64 {
        self.p.eval(z)
    }

    /// Absolute salinity (g/kg) at the displaced depth.
    pub fn get_sa(&self, z: f64) -> f64 {
        self.sa.eval(self.shifted(z))
    }

    /// Conservative temperature (°C) at the displaced depth.
    pub fn get_ct(&self, z: f64) -> f64 {
        self.ct.eval(self.shifted(z))
    }

    /// In-situ temperature (°C).
    pub fn get_temp(&self, z: f64) -> f64 {
        self.eos
            .t_from_ct(self.get_sa(z), self.get_ct(z), self.get_p(z))
    }

    /// Practical salinity (PSU) at the displaced depth.
    pub fn get_s(&self, z: f64) -> f64 {
        self.sp.eval(self.shifted(z))
    }

    /// Potential temperature (°C).
    pub fn get_theta(&self, z: f64) -> f64 {
        let zs = self.shifted(z);
        self.eos.pt_from_ct(self.sa.eval(zs), self.ct.eval(zs))
    }

    /// In-situ density (kg/m³).
    ///
    /// With `ignore_temp`, the surface conservative temperature replaces the
    /// local one so that only salinity and pressure shape the stratification.
    pub fn get_rho(&self, z: f64, ignore_temp: bool) -> f64 {
        let ct = if ignore_temp {
            self.ct_surface
        } else {
            self.get_ct(z)
        };
        self.eos.rho(self.get_sa(z), ct, self.get_p(z))
    }

    /// Density at every depth in `z`.
    pub fn rho_profile(&self, z: &[f64], ignore_temp: bool) -> Vec<f64> {
        if ignore_temp {
            info!(
                ct = self.ct_surface,
                "uniform conservative temperature in water density"
            );
        }
        z.iter().map(|&zi| self.get_rho(zi, ignore_temp)).collect()
    }

    /// Tabulated in-situ temperature, undisplaced.
    pub fn tabulated_temp(&self, z: f64) -> f64 {
        self.temp.eval(z)
    }
}
