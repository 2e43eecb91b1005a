//! Profile sources: where water column data comes from.
//!
//! A [`ProfileSource`] is queried once, when a [`WaterColumn`](crate::WaterColumn)
//! is built. Climatology readers (e.g. World Ocean Atlas files) live outside
//! this crate and only need to implement the trait.

use crate::eos::SeawaterEos;
use crate::error::{OceanError, OceanResult};
use serde::{Deserialize, Serialize};

/// Depth-ordered hydrographic profile on a single grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Longitude of the profile (degrees east)
    pub lon: f64,
    /// Latitude of the profile (degrees north)
    pub lat: f64,
    /// Depth of each level (m, negative downward)
    pub z: Vec<f64>,
    /// Sea pressure (dbar)
    pub p: Vec<f64>,
    /// In-situ temperature (°C)
    pub temp: Vec<f64>,
    /// Absolute salinity (g/kg)
    pub sa: Vec<f64>,
    /// Conservative temperature (°C)
    pub ct: Vec<f64>,
    /// Practical salinity (PSU)
    pub sp: Vec<f64>,
}

impl Profile {
    /// Number of levels.
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Check array lengths and finiteness.
    pub fn validate(&self) -> OceanResult<()> {
        let n = self.z.len();
        if n < 2 {
            return Err(OceanError::InvalidProfile {
                what: format!("profile has {n} levels, at least two are required"),
            });
        }
        let fields: [(&'static str, &Vec<f64>); 6] = [
            ("z", &self.z),
            ("p", &self.p),
            ("temp", &self.temp),
            ("sa", &self.sa),
            ("ct", &self.ct),
            ("sp", &self.sp),
        ];
        for (what, values) in fields {
            if values.len() != n {
                return Err(OceanError::InvalidProfile {
                    what: format!("{what} has {} levels, depth has {n}", values.len()),
                });
            }
            if let Some(level) = values.iter().position(|v| !v.is_finite()) {
                return Err(OceanError::NonFinite { what, level });
            }
        }
        Ok(())
    }
}

/// Something that can supply a profile for a location.
pub trait ProfileSource {
    /// Produce the profile nearest to `(lon, lat)`.
    fn profile(&self, lon: f64, lat: f64, eos: &dyn SeawaterEos) -> OceanResult<Profile>;
}

/// Sea pressure (dbar) at depth `z` (m, negative downward), Saunders (1981).
pub fn p_from_z(z: f64, lat: f64) -> f64 {
    let depth = -z;
    let sin_lat = lat.to_radians().sin();
    let c1 = (5.92 + 5.25 * sin_lat * sin_lat) * 1e-3;
    ((1.0 - c1) - ((1.0 - c1).powi(2) - 8.84e-6 * depth).sqrt()) / 4.42e-6
}

/// Profile tabulated in depth, in-situ temperature and practical salinity,
/// the way climatologies publish them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedProfile {
    /// Depth levels (m, negative downward)
    pub z: Vec<f64>,
    /// In-situ temperature (°C)
    pub temp: Vec<f64>,
    /// Practical salinity (PSU)
    pub sp: Vec<f64>,
}

impl ProfileSource for TabulatedProfile {
    fn profile(&self, lon: f64, lat: f64, eos: &dyn SeawaterEos) -> OceanResult<Profile> {
        if self.temp.len() != self.z.len() || self.sp.len() != self.z.len() {
            return Err(OceanError::InvalidProfile {
                what: format!(
                    "table has {} depths, {} temperatures, {} salinities",
                    self.z.len(),
                    self.temp.len(),
                    self.sp.len()
                ),
            });
        }
        let p: Vec<f64> = self.z.iter().map(|&z| p_from_z(z, lat)).collect();
        let sa: Vec<f64> = self
            .sp
            .iter()
            .zip(&p)
            .map(|(&sp, &p)| eos.sa_from_sp(sp, p, lon, lat))
            .collect();
        let ct = sa
            .iter()
            .zip(&self.temp)
            .zip(&p)
            .map(|((&sa, &t), &p)| eos.ct_from_t(sa, t, p))
            .collect();

        let profile = Profile {
            lon,
            lat,
            z: self.z.clone(),
            p,
            temp: self.temp.clone(),
            sa,
            ct,
            sp: self.sp.clone(),
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Homogeneous water between the surface and `z_bottom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformProfile {
    /// In-situ temperature (°C)
    pub temp: f64,
    /// Practical salinity (PSU)
    pub sp: f64,
    /// Deepest level (m, negative)
    pub z_bottom: f64,
}

impl Default for UniformProfile {
    fn default() -> Self {
        Self {
            temp: 15.0,
            sp: 35.0,
            z_bottom: -1000.0,
        }
    }
}

impl ProfileSource for UniformProfile {
    fn profile(&self, lon: f64, lat: f64, eos: &dyn SeawaterEos) -> OceanResult<Profile> {
        if !(self.z_bottom < 0.0) {
            return Err(OceanError::InvalidProfile {
                what: "z_bottom must be below the surface".to_string(),
            });
        }
        TabulatedProfile {
            z: vec![0.0, self.z_bottom],
            temp: vec![self.temp; 2],
            sp: vec![self.sp; 2],
        }
        .profile(lon, lat, eos)
    }
}
