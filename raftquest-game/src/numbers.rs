//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Percentage of `part` over `total` in `0..=100`, or 0 when `total` is zero.
#[must_use]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count_to_f64(part) / count_to_f64(total) * 100.0;
    pct.clamp(0.0, 100.0)
}

/// Whether every value is finite and strictly positive.
#[must_use]
pub fn all_positive_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_zero_total() {
        assert!(percentage(3, 0).abs() < f64::EPSILON);
        assert!((percentage(1, 4) - 25.0).abs() < f64::EPSILON);
        assert!((percentage(5, 4) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn positivity_rejects_nan_and_zero() {
        assert!(all_positive_finite(&[1.0, 2.5]));
        assert!(!all_positive_finite(&[1.0, 0.0]));
        assert!(!all_positive_finite(&[f64::NAN]));
        assert!(!all_positive_finite(&[f64::INFINITY]));
    }
}
