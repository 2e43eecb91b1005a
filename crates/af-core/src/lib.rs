//! af-core: stable foundation for the float simulator.
//!
//! Contains:
//! - units (uom SI types + constructors, physical constants)
//! - numeric (Real, finiteness checks, sign and central differences)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
