//! Small order statistics shared by the pipeline stages.

use std::cmp::Ordering;

/// Gaussian-consistent scale factor for the median absolute deviation.
pub const MAD_TO_SIGMA: f64 = 1.4826;

fn total_cmp(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Median of a slice, reordering it in place. Returns `None` when empty.
///
/// For an even count the two middle values are averaged.
pub fn median_in_place(values: &mut [f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }

    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        Some(upper)
    } else {
        let lower_max = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lower_max + upper) / 2.0)
    }
}

/// Median of a slice without touching the input.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut scratch = values.to_vec();
    median_in_place(&mut scratch)
}

/// Arithmetic mean. Returns `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Robust standard deviation estimate: `1.4826 × MAD`.
pub fn robust_sigma(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    let mut deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median_in_place(&mut deviations).map(|mad| MAD_TO_SIGMA * mad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median_does_not_reorder_input() {
        let values = vec![5.0, 1.0, 4.0];
        let _ = median(&values);
        assert_eq!(values, vec![5.0, 1.0, 4.0]);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_robust_sigma_ignores_single_outlier() {
        let values = [1.0, 1.0, 1.0, 1.0, 100.0];
        assert_eq!(robust_sigma(&values), Some(0.0));

        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let sigma = robust_sigma(&values).unwrap();
        assert!((sigma - MAD_TO_SIGMA).abs() < 1e-12);
    }
}
