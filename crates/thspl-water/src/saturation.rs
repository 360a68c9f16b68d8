//! Boiling and dew enthalpy as functions of pressure.

use crate::data::{SaturationDef, malformed};
use crate::error::{WaterError, WaterResult};
use thspl_spline::{Breakpoints, PiecewisePolynomial};

/// Largest boiling/dew gap tolerated at the critical pressure [J/kg].
pub const CRITICAL_GAP_TOL: f64 = 1e-3;

/// Which saturation curve to evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    Boiling,
    Dew,
}

/// The two saturation splines over `[p_sat_min, p_crit]`.
#[derive(Clone, Debug)]
pub struct SaturationCurves {
    boiling: PiecewisePolynomial,
    dew: PiecewisePolynomial,
}

impl SaturationCurves {
    /// Build both curves and check them against each other.
    ///
    /// Fails if the curves do not span exactly `[p_sat_min, p_crit]`, if boiling
    /// exceeds dew anywhere on the breakpoints or cell midpoints, or if the curves
    /// do not meet at `p_crit`.
    pub fn from_def(def: &SaturationDef, p_sat_min: f64, p_crit: f64) -> WaterResult<Self> {
        let bp = Breakpoints::new(def.breakpoints.clone(), "saturation pressure")?;
        let boiling = PiecewisePolynomial::new(
            bp.clone(),
            def.boiling.degree,
            def.boiling.coefficients.clone(),
            "boiling curve",
        )?;
        let dew =
            PiecewisePolynomial::new(bp, def.dew.degree, def.dew.coefficients.clone(), "dew curve")?;
        let curves = Self { boiling, dew };
        curves.validate(p_sat_min, p_crit)?;
        Ok(curves)
    }

    fn validate(&self, p_sat_min: f64, p_crit: f64) -> WaterResult<()> {
        let (lo, hi) = self.domain();
        if lo != p_sat_min || hi != p_crit {
            return Err(malformed(format!(
                "saturation curves span [{lo}, {hi}] but the table declares [{p_sat_min}, {p_crit}]"
            )));
        }

        let bp = self.boiling.breakpoints().as_slice();
        let midpoints = bp.windows(2).map(|w| 0.5 * (w[0] + w[1]));
        for p in bp.iter().copied().chain(midpoints) {
            self.bounds(p)?;
        }

        let gap = (self.boiling.evaluate(p_crit, 0)? - self.dew.evaluate(p_crit, 0)?).abs();
        if gap > CRITICAL_GAP_TOL {
            return Err(malformed(format!(
                "boiling and dew curves are {gap} J/kg apart at the critical pressure"
            )));
        }
        Ok(())
    }

    /// `(first, last)` fitted pressure.
    pub fn domain(&self) -> (f64, f64) {
        self.boiling.domain()
    }

    /// Value or `order`-th pressure derivative of one curve.
    pub fn evaluate(&self, curve: Curve, p: f64, order: usize) -> WaterResult<f64> {
        let poly = match curve {
            Curve::Boiling => &self.boiling,
            Curve::Dew => &self.dew,
        };
        Ok(poly.evaluate(p, order)?)
    }

    pub fn boiling(&self, p: f64) -> WaterResult<f64> {
        self.evaluate(Curve::Boiling, p, 0)
    }

    pub fn dew(&self, p: f64) -> WaterResult<f64> {
        self.evaluate(Curve::Dew, p, 0)
    }

    /// `(boiling, dew)` at `p`, rejecting an inverted pair.
    pub fn bounds(&self, p: f64) -> WaterResult<(f64, f64)> {
        let boiling = self.boiling(p)?;
        let dew = self.dew(p)?;
        if boiling > dew {
            return Err(WaterError::SaturationInversion {
                pressure: p,
                boiling,
                dew,
            });
        }
        Ok((boiling, dew))
    }
}
