//! Transit candidate detection.
//!
//! A candidate is a sustained run of samples below the unit baseline. The
//! detector works in three passes over each continuous segment of the
//! normalized curve:
//!
//! 1. **Runs**: maximal stretches of consecutive in-dip samples.
//! 2. **Merge**: runs separated by fewer than `min_duration_samples / 2`
//!    out-of-dip samples are treated as one dip broken up by noise.
//! 3. **Qualify**: a merged group becomes a candidate only if at least one
//!    of its runs is `min_duration_samples` long on its own. Short runs may
//!    extend a real dip but never form one, so single-sample noise spikes
//!    cannot be stitched together into a transit.

use std::ops::Range;

use log::debug;

use crate::algorithms::stats;
use crate::models::{NormalizedCurve, Sample, TransitCandidate};

/// Fractional dip depth a sample must reach to count as in-dip.
pub const DEFAULT_DEPTH_THRESHOLD: f64 = 0.001;

/// Fewest in-dip samples a candidate may contain.
pub const DEFAULT_MIN_DURATION_SAMPLES: usize = 3;

/// Rounding allowance so a dip of exactly the threshold depth is in-dip.
const THRESHOLD_EPSILON: f64 = 1e-12;

/// Lower bound on the noise estimate used for significance.
const MIN_NOISE: f64 = 1e-12;

/// A merged group of runs inside one segment.
#[derive(Debug, Clone)]
struct DipGroup {
    span: Range<usize>,
    /// Length of the longest run in the group.
    longest_run: usize,
}

/// Flag sustained flux dips in a normalized curve.
///
/// Returns candidates ordered by start time; an empty vector means no dip
/// qualified. `depth_threshold` is a fraction of the unit baseline.
pub fn detect_candidates(
    curve: &NormalizedCurve,
    depth_threshold: f64,
    min_duration_samples: usize,
) -> Vec<TransitCandidate> {
    let samples = curve.samples();
    let cutoff = 1.0 - depth_threshold + THRESHOLD_EPSILON;
    let in_dip: Vec<bool> = samples.iter().map(|s| s.flux <= cutoff).collect();

    let mut fallback_noise = None;
    let mut candidates = Vec::new();
    let mut rejected = 0usize;

    for segment in curve.segments() {
        let runs = find_runs(&in_dip, segment);
        for group in merge_runs(&runs, min_duration_samples) {
            if group.longest_run < min_duration_samples {
                rejected += 1;
                continue;
            }
            candidates.push(build_candidate(samples, &group, || {
                *fallback_noise.get_or_insert_with(|| {
                    stats::robust_sigma(&curve.flux_series()).unwrap_or(0.0)
                })
            }));
        }
    }

    candidates.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        "Detected {} candidates in {} ({} short dips rejected)",
        candidates.len(),
        curve.source_id(),
        rejected
    );

    candidates
}

/// Maximal runs of in-dip samples inside `segment`.
fn find_runs(in_dip: &[bool], segment: Range<usize>) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for i in segment.clone() {
        match (in_dip[i], start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..segment.end);
    }
    runs
}

/// Merge runs whose separating gap is shorter than half the minimum duration.
fn merge_runs(runs: &[Range<usize>], min_duration_samples: usize) -> Vec<DipGroup> {
    let mut groups: Vec<DipGroup> = Vec::new();
    for run in runs {
        if let Some(last) = groups.last_mut() {
            let gap = run.start - last.span.end;
            if 2 * gap < min_duration_samples {
                last.span.end = run.end;
                last.longest_run = last.longest_run.max(run.len());
                continue;
            }
        }
        groups.push(DipGroup {
            span: run.clone(),
            longest_run: run.len(),
        });
    }
    groups
}

fn build_candidate(
    samples: &[Sample],
    group: &DipGroup,
    fallback_noise: impl FnOnce() -> f64,
) -> TransitCandidate {
    let dip = &samples[group.span.clone()];

    let min_flux = dip.iter().map(|s| s.flux).fold(f64::INFINITY, f64::min);
    let depth = (1.0 - min_flux).min(1.0);

    let errors: Vec<f64> = dip.iter().map(|s| s.flux_error).collect();
    let mean_error = stats::mean(&errors).unwrap_or(0.0);
    let noise = if mean_error > 0.0 {
        mean_error
    } else {
        fallback_noise()
    };

    TransitCandidate {
        start_time: dip[0].time,
        end_time: dip[dip.len() - 1].time,
        depth,
        significance: depth / noise.max(MIN_NOISE),
    }
}
