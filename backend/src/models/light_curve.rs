//! Light-curve domain types.
//!
//! A [`LightCurve`] is what the parser produces and the validator checks; a
//! [`NormalizedCurve`] is the detrended, unit-baseline copy the detector scans.
//! Both own their sample buffers.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::algorithms::stats;
use crate::error::ParseError;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A gap wider than this many cadences is a discontinuity.
pub const DISCONTINUITY_FACTOR: f64 = 10.0;

/// One photometric measurement. `time` is in days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub time: f64,
    pub flux: f64,
    pub flux_error: f64,
}

impl Sample {
    pub fn new(time: f64, flux: f64, flux_error: f64) -> Self {
        Self {
            time,
            flux,
            flux_error,
        }
    }
}

/// Ordered photometric time series for a single source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightCurve {
    source_id: String,
    samples: Vec<Sample>,
    cadence_seconds: f64,
    discontinuities: Vec<usize>,
}

impl LightCurve {
    /// Build a curve, deriving cadence and discontinuities from the samples.
    ///
    /// Fails with [`ParseError::InsufficientData`] when fewer than two
    /// samples are given.
    pub fn new(source_id: impl Into<String>, samples: Vec<Sample>) -> Result<Self, ParseError> {
        if samples.len() < 2 {
            return Err(ParseError::InsufficientData {
                data_rows: samples.len(),
            });
        }

        let cadence_days = median_cadence_days(&samples);
        let discontinuities = find_discontinuities(&samples, cadence_days);

        Ok(Self {
            source_id: source_id.into(),
            samples,
            cadence_seconds: cadence_days * SECONDS_PER_DAY,
            discontinuities,
        })
    }

    /// Stable-sort the samples by time and recompute discontinuities.
    pub fn sorted_by_time(self) -> Self {
        let mut samples = self.samples;
        samples.sort_by(|a, b| {
            a.time
                .partial_cmp(&b.time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let cadence_days = self.cadence_seconds / SECONDS_PER_DAY;
        let discontinuities = find_discontinuities(&samples, cadence_days);
        Self {
            source_id: self.source_id,
            samples,
            cadence_seconds: self.cadence_seconds,
            discontinuities,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Median positive time delta, in seconds.
    pub fn cadence_seconds(&self) -> f64 {
        self.cadence_seconds
    }

    pub fn cadence_days(&self) -> f64 {
        self.cadence_seconds / SECONDS_PER_DAY
    }

    /// Indices `i` such that the step from sample `i` to `i + 1` is a gap.
    pub fn discontinuities(&self) -> &[usize] {
        &self.discontinuities
    }

    /// Index ranges of the continuous stretches between discontinuities.
    pub fn segments(&self) -> Vec<Range<usize>> {
        segments(self.samples.len(), &self.discontinuities)
    }

    pub fn fluxes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.flux).collect()
    }
}

/// A light curve whose flux median is 1.0 with the slow trend removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCurve {
    source_id: String,
    samples: Vec<Sample>,
    trend: Vec<f64>,
    window: usize,
    cadence_seconds: f64,
    discontinuities: Vec<usize>,
}

impl NormalizedCurve {
    pub(crate) fn from_parts(
        source: &LightCurve,
        samples: Vec<Sample>,
        trend: Vec<f64>,
        window: usize,
    ) -> Self {
        Self {
            source_id: source.source_id.clone(),
            samples,
            trend,
            window,
            cadence_seconds: source.cadence_seconds,
            discontinuities: source.discontinuities.clone(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Rolling-median trend that was subtracted, in units of the median flux.
    pub fn trend(&self) -> &[f64] {
        &self.trend
    }

    /// Rolling window width actually used, in samples.
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn cadence_seconds(&self) -> f64 {
        self.cadence_seconds
    }

    pub fn discontinuities(&self) -> &[usize] {
        &self.discontinuities
    }

    pub fn segments(&self) -> Vec<Range<usize>> {
        segments(self.samples.len(), &self.discontinuities)
    }

    /// Normalized flux values, in time order.
    pub fn flux_series(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.flux).collect()
    }

    pub fn median_flux(&self) -> f64 {
        stats::median(&self.flux_series()).unwrap_or(1.0)
    }

    /// Copy the normalized samples into a plain [`LightCurve`].
    pub fn to_light_curve(&self) -> LightCurve {
        LightCurve {
            source_id: self.source_id.clone(),
            samples: self.samples.clone(),
            cadence_seconds: self.cadence_seconds,
            discontinuities: self.discontinuities.clone(),
        }
    }
}

fn median_cadence_days(samples: &[Sample]) -> f64 {
    let mut times: Vec<f64> = samples.iter().map(|s| s.time).collect();
    times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut deltas: Vec<f64> = times
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .collect();

    stats::median_in_place(&mut deltas).unwrap_or(0.0)
}

fn find_discontinuities(samples: &[Sample], cadence_days: f64) -> Vec<usize> {
    if cadence_days <= 0.0 {
        return Vec::new();
    }
    let max_step = DISCONTINUITY_FACTOR * cadence_days;
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[1].time - w[0].time > max_step)
        .map(|(i, _)| i)
        .collect()
}

fn segments(len: usize, discontinuities: &[usize]) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(discontinuities.len() + 1);
    let mut start = 0;
    for &gap in discontinuities {
        let end = gap + 1;
        if end > start && end <= len {
            ranges.push(start..end);
            start = end;
        }
    }
    if start < len {
        ranges.push(start..len);
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evenly_spaced(n: usize, cadence: f64) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(i as f64 * cadence, 1.0, 0.0001))
            .collect()
    }

    #[test]
    fn test_requires_two_samples() {
        let result = LightCurve::new("one", vec![Sample::new(0.0, 1.0, 0.0)]);
        assert_eq!(result, Err(ParseError::InsufficientData { data_rows: 1 }));
    }

    #[test]
    fn test_cadence_is_median_delta_in_seconds() {
        let curve = LightCurve::new("even", evenly_spaced(10, 0.02)).unwrap();
        assert!((curve.cadence_seconds() - 0.02 * SECONDS_PER_DAY).abs() < 1e-6);
        assert!((curve.cadence_days() - 0.02).abs() < 1e-12);
        assert!(curve.discontinuities().is_empty());
    }

    #[test]
    fn test_cadence_ignores_input_order() {
        let mut samples = evenly_spaced(6, 0.5);
        samples.reverse();
        let curve = LightCurve::new("reversed", samples).unwrap();
        assert!((curve.cadence_days() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_large_gap_marked_as_discontinuity() {
        let mut samples = evenly_spaced(5, 0.02);
        samples.extend((0..5).map(|i| Sample::new(3.0 + i as f64 * 0.02, 1.0, 0.0001)));

        let curve = LightCurve::new("gappy", samples).unwrap();
        assert_eq!(curve.discontinuities(), &[4]);
        assert_eq!(curve.segments(), vec![0..5, 5..10]);
    }

    #[test]
    fn test_segments_without_gaps_cover_everything() {
        assert_eq!(segments(4, &[]), vec![0..4]);
        assert_eq!(segments(4, &[0, 2]), vec![0..1, 1..3, 3..4]);
    }
}
