//! Spline construction and evaluation errors.

use thiserror::Error;
use thspl_core::CoreError;

/// Result type for spline operations.
pub type SplineResult<T> = Result<T, SplineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Fewer than two breakpoints on an axis.
    #[error("Too few breakpoints for {what}: {len} (need at least 2)")]
    TooFewBreakpoints { what: &'static str, len: usize },

    #[error("Breakpoints for {what} are not strictly increasing at index {index}")]
    NotIncreasing { what: &'static str, index: usize },

    /// Coefficient array does not match cell count and degree.
    #[error("Coefficient count mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite coefficient for {what} at index {index}")]
    NonFiniteCoefficient { what: &'static str, index: usize },

    /// Query outside the breakpoint range of an axis.
    #[error("{axis} = {value} outside fitted range [{lower}, {upper}]")]
    OutOfDomain {
        axis: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },
}
