//! Cadastral survey tolerance.
//!
//! `permissible = 0.8 * sqrt(A) + 0.002 * A`, where `A` is the registered area
//! in square meters.

/// Coefficient of the square-root term.
pub const SQRT_COEFFICIENT: f64 = 0.8;

/// Coefficient of the linear term.
pub const LINEAR_COEFFICIENT: f64 = 0.002;

/// Maximum acceptable |registered - calculated| for a registered area.
pub fn permissible_error(registered_area: f64) -> f64 {
    (SQRT_COEFFICIENT * registered_area.sqrt()) + (LINEAR_COEFFICIENT * registered_area)
}

/// Strict comparison: a difference equal to the permissible error is still
/// within tolerance and gets rescaled.
pub fn exceeds_limit(absolute_difference: f64, permissible_error: f64) -> bool {
    absolute_difference > permissible_error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_square_meters() {
        // 0.8 * 31.6227766 + 2.0
        let p = permissible_error(1000.0);
        assert!((p - 27.298221281347036).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn perfect_square_is_exact() {
        // 0.8 * 100 + 0.002 * 10000 = 80 + 20
        assert_eq!(permissible_error(10_000.0), 100.0);
    }

    #[test]
    fn boundary_is_within_tolerance() {
        assert!(!exceeds_limit(100.0, 100.0));
        assert!(exceeds_limit(100.000001, 100.0));
        assert!(!exceeds_limit(0.0, 0.0));
    }
}
