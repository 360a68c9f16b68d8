//! Bivariate tensor-product piecewise polynomials.
//!
//! On cell `(i, j)` the surface is
//!
//! ```text
//! f(x, y) = sum_a sum_b c[i][j][a][b] * (x - x_i)^a * (y - y_j)^b
//! ```
//!
//! Cells are stored x-cell major (`i * ny_cells + j`), and within a cell the
//! coefficients run row-major over `(a, b)` with `a` the power of the x offset.
//! Partial derivatives differentiate the power basis directly, so every order is
//! exact and the result for a given point and coefficient set never varies.

use crate::basis::falling_factorial;
use crate::breakpoints::Breakpoints;
use crate::error::{SplineError, SplineResult};

#[derive(Clone, Debug, PartialEq)]
pub struct TensorPolynomial {
    x: Breakpoints,
    y: Breakpoints,
    degree: [usize; 2],
    coefficients: Vec<f64>,
}

impl TensorPolynomial {
    pub fn new(
        x: Breakpoints,
        y: Breakpoints,
        degree: [usize; 2],
        coefficients: Vec<f64>,
        what: &'static str,
    ) -> SplineResult<Self> {
        let per_cell = (degree[0] + 1) * (degree[1] + 1);
        let expected = x.cells() * y.cells() * per_cell;
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
            x,
            y,
            degree,
            coefficients,
        })
    }

    pub fn x_breakpoints(&self) -> &Breakpoints {
        &self.x
    }

    pub fn y_breakpoints(&self) -> &Breakpoints {
        &self.y
    }

    pub fn degree(&self) -> [usize; 2] {
        self.degree
    }

    /// `(x cells, y cells)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.x.cells(), self.y.cells())
    }

    /// Coefficients of cell `(i, j)`.
    pub fn cell(&self, i: usize, j: usize) -> &[f64] {
        let per_cell = (self.degree[0] + 1) * (self.degree[1] + 1);
        let base = (i * self.y.cells() + j) * per_cell;
        &self.coefficients[base..base + per_cell]
    }

    /// `d^dx/dx^dx d^dy/dy^dy f(x, y)`.
    pub fn evaluate(&self, x: f64, y: f64, dx: usize, dy: usize) -> SplineResult<f64> {
        let x = self.x.check(x, "x")?;
        let y = self.y.check(y, "y")?;
        let (i, j) = (self.x.locate(x), self.y.locate(y));
        Ok(self.evaluate_cell(i, j, x - self.x.origin(i), y - self.y.origin(j), dx, dy))
    }

    /// The x-derivatives of orders `0..=max_dx` at one point, sharing the cell lookup.
    ///
    /// Orders above the x degree are identically zero and are left out, so the
    /// result holds `min(max_dx, kx) + 1` values.
    pub fn x_derivatives(&self, x: f64, y: f64, max_dx: usize) -> SplineResult<Vec<f64>> {
        let x = self.x.check(x, "x")?;
        let y = self.y.check(y, "y")?;
        let (i, j) = (self.x.locate(x), self.y.locate(y));
        let (s, t) = (x - self.x.origin(i), y - self.y.origin(j));
        Ok((0..=max_dx.min(self.degree[0]))
            .map(|dx| self.evaluate_cell(i, j, s, t, dx, 0))
            .collect())
    }

    fn evaluate_cell(&self, i: usize, j: usize, s: f64, t: f64, dx: usize, dy: usize) -> f64 {
        let [kx, ky] = self.degree;
        if dx > kx || dy > ky {
            return 0.0;
        }
        let c = self.cell(i, j);
        let row_len = ky + 1;
        let mut acc = 0.0;
        for a in (dx..=kx).rev() {
            let row = &c[a * row_len..(a + 1) * row_len];
            let mut inner = 0.0;
            for b in (dy..=ky).rev() {
                inner = inner * t + row[b] * falling_factorial(b, dy);
            }
            acc = acc * s + inner * falling_factorial(a, dx);
        }
        acc
    }
}
