//! Flux normalization and detrending.
//!
//! The curve is scaled to a unit median, a centered rolling median is
//! subtracted to remove slow stellar or instrumental drift, and the result
//! is re-centered so its median is exactly 1.0. Short dips survive because
//! a median over a window much longer than the dip ignores them.

use log::debug;

use crate::algorithms::stats;
use crate::models::{LightCurve, NormalizedCurve, Sample, SECONDS_PER_DAY};

/// Smallest rolling window, in samples.
pub const MIN_WINDOW: usize = 5;

/// Force a window to be odd and at least [`MIN_WINDOW`].
pub fn coerce_window(window: usize) -> usize {
    let window = window.max(MIN_WINDOW);
    if window % 2 == 0 {
        window + 1
    } else {
        window
    }
}

/// Widest window worth computing for a curve of `len` samples.
///
/// From any sample, a window of `2 * len - 1` already reaches both ends of
/// the curve, so anything wider gives the same medians.
pub fn widest_window(len: usize) -> usize {
    (len.saturating_mul(2).saturating_sub(1) | 1).max(MIN_WINDOW)
}

/// Window covering roughly one day of samples at the given cadence.
///
/// Fine cadences give very wide windows; [`normalize`] caps them with
/// [`widest_window`].
pub fn default_window(cadence_seconds: f64) -> usize {
    if !cadence_seconds.is_finite() || cadence_seconds <= 0.0 {
        return MIN_WINDOW;
    }
    let per_day = (SECONDS_PER_DAY / cadence_seconds).round();
    coerce_window(per_day.min(usize::MAX as f64) as usize)
}

/// Normalize and detrend a validated light curve.
///
/// `window` is coerced with [`coerce_window`] and capped at
/// [`widest_window`] for the curve length. Near either end of the curve,
/// and on either side of a discontinuity, the window is clipped to the
/// samples that exist: nothing wraps around and nothing is extrapolated.
pub fn normalize(curve: &LightCurve, window: usize) -> NormalizedCurve {
    let window = coerce_window(window).min(widest_window(curve.len()));
    let half = window / 2;

    let fluxes = curve.fluxes();
    let scale = positive_median(&fluxes);
    let scaled: Vec<f64> = fluxes.iter().map(|f| f / scale).collect();

    let mut trend = vec![1.0; scaled.len()];
    let mut scratch = Vec::with_capacity(window.min(scaled.len()));
    for segment in curve.segments() {
        for i in segment.clone() {
            let lo = i.saturating_sub(half).max(segment.start);
            let hi = (i + half + 1).min(segment.end);
            scratch.clear();
            scratch.extend_from_slice(&scaled[lo..hi]);
            trend[i] = stats::median_in_place(&mut scratch).unwrap_or(1.0);
        }
    }

    let detrended: Vec<f64> = scaled
        .iter()
        .zip(&trend)
        .map(|(f, t)| f - t + 1.0)
        .collect();
    let recenter = positive_median(&detrended);

    let samples: Vec<Sample> = curve
        .samples()
        .iter()
        .zip(&detrended)
        .map(|(s, f)| Sample::new(s.time, f / recenter, s.flux_error / scale / recenter))
        .collect();

    debug!(
        "Normalized {} ({} samples, window {}, scale {:.6})",
        curve.source_id(),
        samples.len(),
        window,
        scale
    );

    NormalizedCurve::from_parts(curve, samples, trend, window)
}

/// Median usable as a divisor; 1.0 when it is zero, negative or undefined.
fn positive_median(values: &[f64]) -> f64 {
    stats::median(values)
        .filter(|m| m.is_finite() && *m > 0.0)
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_from_fluxes(fluxes: &[f64], cadence: f64) -> LightCurve {
        let samples = fluxes
            .iter()
            .enumerate()
            .map(|(i, &f)| Sample::new(i as f64 * cadence, f, 0.0002))
            .collect();
        LightCurve::new("norm", samples).unwrap()
    }

    #[test]
    fn test_coerce_window() {
        assert_eq!(coerce_window(0), 5);
        assert_eq!(coerce_window(4), 5);
        assert_eq!(coerce_window(6), 7);
        assert_eq!(coerce_window(51), 51);
    }

    #[test]
    fn test_default_window_is_about_one_day() {
        // 0.02 d cadence -> 50 samples per day -> 51
        assert_eq!(default_window(0.02 * SECONDS_PER_DAY), 51);
        // 30 minute cadence -> 48 -> 49
        assert_eq!(default_window(1800.0), 49);
        // 12 hour cadence -> 2 -> minimum
        assert_eq!(default_window(43_200.0), MIN_WINDOW);
        assert_eq!(default_window(0.0), MIN_WINDOW);
    }

    #[test]
    fn test_widest_window() {
        assert_eq!(widest_window(0), MIN_WINDOW);
        assert_eq!(widest_window(2), MIN_WINDOW);
        assert_eq!(widest_window(40), 79);
        assert_eq!(widest_window(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_oversized_window_capped_to_curve() {
        let fluxes: Vec<f64> = (0..40).map(|i| 1.0 + 0.0001 * (i % 7) as f64).collect();
        let curve = curve_from_fluxes(&fluxes, 0.02);

        let huge = normalize(&curve, usize::MAX);
        let widest = normalize(&curve, 79);
        assert_eq!(huge.window(), 79);
        assert_eq!(huge.flux_series(), widest.flux_series());
        assert_eq!(huge.trend(), widest.trend());
    }

    #[test]
    fn test_fine_cadence_default_window_is_capped() {
        // 1e-9 d cadence asks for about 1e9 samples per day
        let window = default_window(1e-9 * SECONDS_PER_DAY);
        assert!(window > 100_000_000);

        let normalized = normalize(&curve_from_fluxes(&[1.0; 100], 1e-9), window);
        assert_eq!(normalized.window(), 199);
        assert_eq!(normalized.len(), 100);
    }

    #[test]
    fn test_median_scaled_to_one() {
        let fluxes: Vec<f64> = (0..40).map(|i| 1500.0 + (i % 3) as f64).collect();
        let normalized = normalize(&curve_from_fluxes(&fluxes, 0.02), 11);

        assert!((normalized.median_flux() - 1.0).abs() < 1e-12);
        assert_eq!(normalized.len(), 40);
        assert_eq!(normalized.window(), 11);
    }

    #[test]
    fn test_short_dip_preserved() {
        let mut fluxes = vec![1.0; 60];
        for f in fluxes.iter_mut().skip(30).take(5) {
            *f = 0.99;
        }

        let normalized = normalize(&curve_from_fluxes(&fluxes, 0.02), 21);
        let series = normalized.flux_series();

        for f in &series[30..35] {
            assert!((f - 0.99).abs() < 1e-12, "dip flux {}", f);
        }
        assert!((series[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_trend_removed_in_interior() {
        let fluxes: Vec<f64> = (0..200).map(|i| 1.0 + 0.0002 * i as f64).collect();
        let normalized = normalize(&curve_from_fluxes(&fluxes, 0.02), 21);
        let series = normalized.flux_series();

        for f in &series[10..190] {
            assert!((f - 1.0).abs() < 1e-3, "residual trend {}", f);
        }
    }

    #[test]
    fn test_trend_does_not_cross_discontinuity() {
        let mut samples: Vec<Sample> = (0..20)
            .map(|i| Sample::new(i as f64 * 0.02, 1.0, 0.0001))
            .collect();
        samples.extend((0..20).map(|i| Sample::new(5.0 + i as f64 * 0.02, 1.2, 0.0001)));
        let curve = LightCurve::new("step", samples).unwrap();
        assert_eq!(curve.discontinuities(), &[19]);

        let normalized = normalize(&curve, 11);
        for f in normalized.flux_series() {
            assert!((f - 1.0).abs() < 1e-12, "step leaked into trend: {}", f);
        }
    }

    #[test]
    fn test_renormalizing_is_stable() {
        let fluxes: Vec<f64> = (0..300)
            .map(|i| {
                let t = i as f64 * 0.02;
                1.0 + 0.002 * (t * 0.7).sin() + 0.0005 * ((i * 7919) % 13) as f64 / 13.0
            })
            .collect();
        let once = normalize(&curve_from_fluxes(&fluxes, 0.02), 51);
        let twice = normalize(&once.to_light_curve(), 51);

        assert!((twice.median_flux() - once.median_flux()).abs() < 1e-6);
    }

    #[test]
    fn test_output_does_not_alias_input() {
        let curve = curve_from_fluxes(&[2.0, 2.0, 1.0, 2.0, 2.0, 2.0], 0.02);
        let normalized = normalize(&curve, 5);

        assert_eq!(curve.samples()[0].flux, 2.0);
        assert!((normalized.samples()[0].flux - 1.0).abs() < 1e-12);
    }
}
