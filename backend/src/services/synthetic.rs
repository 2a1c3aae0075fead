//! Synthetic light curves for demos and tests.
//!
//! Produces a flat baseline with box-shaped transits and Gaussian noise.
//! A fixed seed always yields the same curve.

use std::io;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::models::Sample;

/// One box-shaped transit. Samples strictly inside `(start, start + duration)`
/// are dimmed by `depth`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticTransit {
    pub start: f64,
    pub duration: f64,
    pub depth: f64,
}

impl SyntheticTransit {
    fn contains(&self, time: f64) -> bool {
        time > self.start && time < self.start + self.duration
    }
}

/// Parameters of a generated curve. Times are in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticCurveSpec {
    pub samples: usize,
    pub cadence_days: f64,
    pub baseline: f64,
    pub noise_sigma: f64,
    pub flux_error: f64,
    pub transits: Vec<SyntheticTransit>,
    pub seed: u64,
}

impl Default for SyntheticCurveSpec {
    /// Ten days at 0.02 d cadence with a single 0.5 d transit at day 5.
    fn default() -> Self {
        Self {
            samples: 500,
            cadence_days: 0.02,
            baseline: 1.0,
            noise_sigma: 0.001,
            flux_error: 0.0001,
            transits: vec![SyntheticTransit {
                start: 5.0,
                duration: 0.5,
                depth: 0.015,
            }],
            seed: 42,
        }
    }
}

impl SyntheticCurveSpec {
    /// Default curve with `count` evenly spaced transits.
    pub fn periodic(first_start: f64, period: f64, duration: f64, depth: f64, count: usize) -> Self {
        let transits = (0..count)
            .map(|i| SyntheticTransit {
                start: first_start + i as f64 * period,
                duration,
                depth,
            })
            .collect();
        Self {
            transits,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_noise(mut self, noise_sigma: f64) -> Self {
        self.noise_sigma = noise_sigma;
        self
    }
}

/// Generate samples for `spec`.
pub fn generate(spec: &SyntheticCurveSpec) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = if spec.noise_sigma > 0.0 {
        Normal::new(0.0, spec.noise_sigma).ok()
    } else {
        None
    };

    (0..spec.samples)
        .map(|i| {
            let time = i as f64 * spec.cadence_days;
            let dip: f64 = spec
                .transits
                .iter()
                .filter(|t| t.contains(time))
                .map(|t| t.depth)
                .sum();
            let jitter = noise.map(|n| n.sample(&mut rng)).unwrap_or(0.0);
            Sample::new(time, spec.baseline - dip + jitter, spec.flux_error)
        })
        .collect()
}

/// Write samples as `time,flux,flux_err` CSV.
pub fn write_csv<W: io::Write>(samples: &[Sample], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["time", "flux", "flux_err"])?;
    for s in samples {
        wtr.write_record(&[
            format!("{:.6}", s.time),
            format!("{:.8}", s.flux),
            format!("{:.8}", s.flux_error),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render samples as `time,flux,flux_err` CSV text.
pub fn to_csv(samples: &[Sample]) -> csv::Result<String> {
    let mut buffer = Vec::with_capacity(32 * (samples.len() + 1));
    write_csv(samples, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
