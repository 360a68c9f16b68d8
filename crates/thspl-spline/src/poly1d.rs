//! One-dimensional piecewise polynomials.

use crate::basis::horner;
use crate::breakpoints::Breakpoints;
use crate::error::{SplineError, SplineResult};

/// Piecewise polynomial `f(x) = sum_a c[i][a] * (x - x_i)^a` on cell `i`.
///
/// Coefficients are stored cell after cell, `degree + 1` per cell, lowest power first.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewisePolynomial {
    breakpoints: Breakpoints,
    degree: usize,
    coefficients: Vec<f64>,
}

impl PiecewisePolynomial {
    pub fn new(
        breakpoints: Breakpoints,
        degree: usize,
        coefficients: Vec<f64>,
        what: &'static str,
    ) -> SplineResult<Self> {
        let expected = breakpoints.cells() * (degree + 1);
        if coefficients.len() != expected {
            return Err(SplineError::ShapeMismatch {
                what,
                expected,
                actual: coefficients.len(),
            });
        }
        if let Some(index) = coefficients.iter().position(|c| !c.is_finite()) {
            return Err(SplineError::NonFiniteCoefficient { what, index });
        }
        Ok(Self {
            breakpoints,
            degree,
            coefficients,
        })
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// `(first, last)` breakpoint.
    pub fn domain(&self) -> (f64, f64) {
        (self.breakpoints.first(), self.breakpoints.last())
    }

    /// Coefficients of cell `i`, lowest power first.
    pub fn cell(&self, i: usize) -> &[f64] {
        let n = self.degree + 1;
        &self.coefficients[i * n..(i + 1) * n]
    }

    /// Value (`order = 0`) or `order`-th derivative at `x`.
    pub fn evaluate(&self, x: f64, order: usize) -> SplineResult<f64> {
        let x = self.breakpoints.check(x, "abscissa")?;
        let i = self.breakpoints.locate(x);
        Ok(horner(self.cell(i), x - self.breakpoints.origin(i), order))
    }
}
