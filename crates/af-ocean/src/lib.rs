//! af-ocean: stratified water column for float simulations.
//!
//! Provides:
//! - [`WaterColumn`]: depth lookups of pressure, temperature, salinity and
//!   density with an isopycnal displacement `eta`
//! - [`SeawaterEos`]: the equation-of-state oracle, with EOS-80 and linear
//!   implementations
//! - [`ProfileSource`]: where profiles come from (tabulated, uniform)
//! - [`LinearInterp`]: 1-D linear interpolation with linear extrapolation
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use af_ocean::{Eos80, TabulatedProfile, WaterColumn};
//!
//! let table = TabulatedProfile {
//!     z: vec![0.0, -100.0, -500.0],
//!     temp: vec![18.0, 13.0, 8.0],
//!     sp: vec![36.0, 35.8, 35.2],
//! };
//! let water = WaterColumn::from_source(&table, -30.0, 30.0, Arc::new(Eos80::new())).unwrap();
//! assert!(water.get_rho(-200.0, false) > water.get_rho(0.0, false));
//! ```

pub mod column;
pub mod eos;
pub mod error;
pub mod interp;
pub mod profile;

pub use column::WaterColumn;
pub use eos::{Eos80, LinearEos, SA_PER_SP, SeawaterEos};
pub use error::{OceanError, OceanResult};
pub use interp::LinearInterp;
pub use profile::{Profile, ProfileSource, TabulatedProfile, UniformProfile, p_from_z};
