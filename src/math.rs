use std::f64::consts::PI;

/// [Exponentiation by squaring][exp-by-squaring] for a non-negative integer exponent.
///
/// ```text
/// (x, n) -> x * x * ... * x   (n times)
/// ```
///
/// [exp-by-squaring]: https://en.wikipedia.org/wiki/Exponentiation_by_squaring
pub fn fast_pow(mut base: f64, mut exp: u32) -> f64 {
    let mut result = 1.0;
    while exp > 0 {
        if exp & 1 == 1 {
            result *= base;
        }
        exp >>= 1;
        base *= base;
    }
    result
}

/// Real `n`-th root.
///
/// For odd `n` the root is sign-preserving, so `root(-8, 3) == -2`.
/// For even `n` a negative argument yields NaN.
pub fn root(x: f64, n: u32) -> f64 {
    let inv = 1.0 / n as f64;
    if n & 1 == 1 && x < 0.0 {
        -(-x).powf(inv)
    } else {
        x.powf(inv)
    }
}

/// Polar angle of the point `(x, y)`, in `[0, 2π)`.
///
/// The origin has angle 0 by convention.
pub fn angle(x: f64, y: f64) -> f64 {
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    if y >= 0.0 {
        y.atan2(x)
    } else {
        y.atan2(x) + 2.0 * PI
    }
}

/// Whether `value` has no fractional part.
pub fn is_integer(value: f64) -> bool {
    value.is_finite() && value.floor() == value
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use super::*;

    #[test]
    fn test_fast_pow() {
        assert_eq!(fast_pow(2.0, 0), 1.0);
        assert_eq!(fast_pow(2.0, 1), 2.0);
        assert_eq!(fast_pow(2.0, 10), 1024.0);
        assert_eq!(fast_pow(-3.0, 3), -27.0);
        assert_eq!(fast_pow(-3.0, 4), 81.0);
        assert_eq!(fast_pow(0.0, 0), 1.0);
    }

    #[test]
    fn test_root() {
        assert_eq!(root(8.0, 3), 2.0);
        assert_eq!(root(-8.0, 3), -2.0);
        assert_eq!(root(16.0, 4), 2.0);
        assert!(root(-16.0, 4).is_nan());
    }

    #[test]
    fn test_angle() {
        assert_eq!(angle(0.0, 0.0), 0.0);
        assert_eq!(angle(1.0, 0.0), 0.0);
        assert!((angle(1.0, 1.0) - FRAC_PI_4).abs() < 1e-12);
        assert!((angle(0.0, 1.0) - FRAC_PI_2).abs() < 1e-12);
        assert!((angle(-1.0, 0.0) - PI).abs() < 1e-12);
        assert!((angle(0.0, -1.0) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_is_integer() {
        assert!(is_integer(3.0));
        assert!(is_integer(-2.0));
        assert!(!is_integer(2.5));
        assert!(!is_integer(f64::NAN));
        assert!(!is_integer(f64::INFINITY));
    }
}
