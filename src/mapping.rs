//! Raw slider values to physically scaled magnitudes.
//!
//! Precondition for every function here: `value` lies in [1, 100]. That is
//! enforced once by [`crate::config::Params::new`]; nothing here re-checks it.

/// Spread of the slope mapping over the full domain.
const SLOPE_SPAN: f64 = 5.906;

/// Normalized position of a value in the [1, 100] domain.
#[inline]
pub fn unit(value: f64) -> f64 {
    (value - 1.0) / 99.0
}

/// Log interpolation onto [0.1, 100]: `10^(-1 + 3·(v-1)/99)`.
#[inline]
pub fn map_log(value: f64) -> f64 {
    10f64.powf(-1.0 + 3.0 * unit(value))
}

/// Linear slope mapping for the transport-side term. Not interchangeable
/// with [`map_log`]; the constant makes `map_slope(50) ≈ map_log(50)` so the
/// all-midpoint state sits on balance.
#[inline]
pub fn map_slope(value: f64) -> f64 {
    0.1 + (value / 100.0) * SLOPE_SPAN
}

/// Linear scaling of a parameter onto `[lo, hi]` (1 → lo, 100 → hi).
#[inline]
pub fn lerp_param(value: f64, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * unit(value) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_mapping_endpoints() {
        assert!((map_log(1.0) - 0.1).abs() < 1e-12);
        assert!((map_log(100.0) - 100.0).abs() < 1e-9);
        assert!((map_log(34.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn slope_mapping_is_linear() {
        assert!((map_slope(0.0) - 0.1).abs() < 1e-12);
        assert!((map_slope(100.0) - 6.006).abs() < 1e-12);
        let mid = map_slope(50.0);
        assert!((mid - (map_slope(0.0) + map_slope(100.0)) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn midpoints_nearly_coincide() {
        let rel = map_log(50.0) / map_slope(50.0);
        assert!((rel - 1.0).abs() < 1e-3, "rel = {rel}");
    }

    #[test]
    fn lerp_param_endpoints() {
        assert_eq!(lerp_param(1.0, 2.0, 12.0), 2.0);
        assert_eq!(lerp_param(100.0, 2.0, 12.0), 12.0);
    }
}
