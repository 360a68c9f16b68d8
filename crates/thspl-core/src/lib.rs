//! thspl-core: numeric foundation for the thspl property engine.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (finiteness checks, clamping, sampling)
//! - timing (accumulating query timers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
