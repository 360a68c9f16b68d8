//! Sorted breakpoint axes and cell lookup.

use crate::error::{SplineError, SplineResult};
use thspl_core::ensure_finite;

/// Relative slack (of the axis span) accepted past either end of an axis.
///
/// Absorbs round-off in callers that compute coordinates, such as the
/// reduced enthalpy of a point sitting exactly on a saturation curve.
pub const EDGE_SLACK: f64 = 1e-12;

/// A strictly increasing, finite axis with at least two breakpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Breakpoints {
    values: Vec<f64>,
}

impl Breakpoints {
    /// Validate and wrap an axis.
    pub fn new(values: Vec<f64>, what: &'static str) -> SplineResult<Self> {
        if values.len() < 2 {
            return Err(SplineError::TooFewBreakpoints {
                what,
                len: values.len(),
            });
        }
        for &v in &values {
            ensure_finite(v, what)?;
        }
        if let Some(index) = values.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SplineError::NotIncreasing {
                what,
                index: index + 1,
            });
        }
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of cells (intervals) along the axis.
    pub fn cells(&self) -> usize {
        self.values.len() - 1
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Lower breakpoint of cell `i`.
    pub fn origin(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Index of the cell `[b[i], b[i+1]]` holding `x`.
    ///
    /// Binary search; a point on an interior breakpoint belongs to the cell on its
    /// right, the last breakpoint belongs to the last cell, and points past either
    /// end map to the nearest end cell.
    pub fn locate(&self, x: f64) -> usize {
        let upper = self.values.partition_point(|&b| b <= x);
        upper.saturating_sub(1).min(self.cells() - 1)
    }

    /// True if `x` lies within the axis, edge slack included.
    pub fn contains(&self, x: f64) -> bool {
        let slack = EDGE_SLACK * (self.last() - self.first());
        x >= self.first() - slack && x <= self.last() + slack
    }

    /// Return `x` snapped into range, or `OutOfDomain` if it lies beyond the slack.
    pub fn check(&self, x: f64, axis: &'static str) -> SplineResult<f64> {
        ensure_finite(x, axis)?;
        if !self.contains(x) {
            return Err(SplineError::OutOfDomain {
                axis,
                value: x,
                lower: self.first(),
                upper: self.last(),
            });
        }
        Ok(x.clamp(self.first(), self.last()))
    }
}
