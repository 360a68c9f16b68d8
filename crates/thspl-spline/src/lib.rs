//! thspl-spline: piecewise-polynomial evaluation over breakpoint grids.
//!
//! Provides:
//! - `Breakpoints`: validated, strictly increasing axis with binary-search cell lookup
//! - `PiecewisePolynomial`: one-dimensional piecewise polynomial in local offsets
//! - `TensorPolynomial`: bivariate tensor-product piecewise polynomial with analytic
//!   partial derivatives
//!
//! Coefficients are stored per cell in ascending powers of the offset from the
//! cell's origin breakpoint. Evaluation never extrapolates: a point outside the
//! breakpoint range is reported as `SplineError::OutOfDomain`.

pub mod basis;
pub mod breakpoints;
pub mod error;
pub mod poly1d;
pub mod poly2d;

pub use breakpoints::Breakpoints;
pub use error::{SplineError, SplineResult};
pub use poly1d::PiecewisePolynomial;
pub use poly2d::TensorPolynomial;
