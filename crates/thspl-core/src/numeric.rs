//! Float helpers shared by the spline and engine crates.

use crate::{CoreError, CoreResult};

pub fn ensure_finite(v: f64, what: &'static str) -> CoreResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Clamp `v` into `[lo, hi]`, reporting whether it moved.
pub fn clamp_flagged(v: f64, lo: f64, hi: f64) -> (f64, bool) {
    if v < lo {
        (lo, true)
    } else if v > hi {
        (hi, true)
    } else {
        (v, false)
    }
}

/// `n` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> CoreResult<Vec<f64>> {
    if n < 2 {
        return Err(CoreError::InvalidArg {
            what: "linspace needs at least two samples",
        });
    }
    ensure_finite(start, "linspace start")?;
    ensure_finite(end, "linspace end")?;
    let step = (end - start) / (n - 1) as f64;
    let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
    // land exactly on the requested end point
    out[n - 1] = end;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn clamp_flagged_reports_movement() {
        assert_eq!(clamp_flagged(0.5, 0.0, 1.0), (0.5, false));
        assert_eq!(clamp_flagged(-2.0, 0.0, 1.0), (0.0, true));
        assert_eq!(clamp_flagged(3.0, 0.0, 1.0), (1.0, true));
    }

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(1e3, 4.5e6, 100).unwrap();
        assert_eq!(xs.len(), 100);
        assert_eq!(xs[0], 1e3);
        assert_eq!(xs[99], 4.5e6);
        assert!(xs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn linspace_rejects_single_sample() {
        assert!(matches!(
            linspace(0.0, 1.0, 1),
            Err(CoreError::InvalidArg { .. })
        ));
    }
}
