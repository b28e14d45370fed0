//! Numeric helpers shared by the parser, resolver and navigator

/// Euclidean modulo, always in `[0, m)` for positive `m`
pub fn modulo(x: i32, m: i32) -> i32 {
    x.rem_euclid(m)
}

/// Float modulo with the sign of the divisor, like `((x % m) + m) % m`
pub fn modulo_f64(x: f64, m: f64) -> f64 {
    ((x % m) + m) % m
}

/// Two cents values are enharmonic if they are within `threshold` of each
/// other, directly or across the equave boundary.
pub fn is_enharmonically_equivalent(cents1: f64, cents2: f64, equave_size: f64, threshold: f64) -> bool {
    let diff = (cents1 - cents2).abs();
    diff < threshold || equave_size.abs() - diff < threshold
}

/// Round to `precision` decimal places without producing `-0`
pub fn round_to(value: f64, precision: u32) -> f64 {
    let mult = 10f64.powi(precision as i32);
    (value * mult).round() / mult + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulo_negative() {
        assert_eq!(modulo(-1, 7), 6);
        assert_eq!(modulo(-7, 7), 0);
        assert_eq!(modulo(15, 7), 1);
        assert!((modulo_f64(-100.0, 1200.0) - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn test_enharmonic_wraparound() {
        assert!(is_enharmonically_equivalent(0.0, 0.001, 1200.0, 0.005));
        assert!(is_enharmonically_equivalent(1199.999, 0.0, 1200.0, 0.005));
        assert!(is_enharmonically_equivalent(1199.999, 0.0, -1200.0, 0.005));
        assert!(!is_enharmonically_equivalent(100.0, 100.01, 1200.0, 0.005));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(-0.0001, 2).to_string(), "0");
    }
}
