//! Power-basis helpers shared by the one- and two-dimensional evaluators.

/// `a! / (a - n)!`, the factor picked up by `t^a` after `n` differentiations.
///
/// Callers guarantee `n <= a`.
#[inline]
pub fn falling_factorial(a: usize, n: usize) -> f64 {
    ((a - n + 1)..=a).fold(1.0, |acc, k| acc * k as f64)
}

/// Evaluate the `order`-th derivative of `sum_a coeffs[a] * t^a` by Horner's rule.
///
/// Orders above the polynomial degree give exactly zero.
#[inline]
pub fn horner(coeffs: &[f64], t: f64, order: usize) -> f64 {
    let mut acc = 0.0;
    for a in (order..coeffs.len()).rev() {
        acc = acc * t + coeffs[a] * falling_factorial(a, order);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falling_factorial_values() {
        assert_eq!(falling_factorial(3, 0), 1.0);
        assert_eq!(falling_factorial(3, 1), 3.0);
        assert_eq!(falling_factorial(3, 2), 6.0);
        assert_eq!(falling_factorial(3, 3), 6.0);
        assert_eq!(falling_factorial(5, 2), 20.0);
    }

    #[test]
    fn horner_cubic_and_derivatives() {
        // 1 + 2t + 3t^2 + 4t^3 at t = 2
        let c = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(horner(&c, 2.0, 0), 1.0 + 4.0 + 12.0 + 32.0);
        assert_eq!(horner(&c, 2.0, 1), 2.0 + 12.0 + 48.0);
        assert_eq!(horner(&c, 2.0, 2), 6.0 + 48.0);
        assert_eq!(horner(&c, 2.0, 3), 24.0);
        assert_eq!(horner(&c, 2.0, 4), 0.0);
    }
}
