//! Aggregation of transit candidates into a [`DetectionSummary`].

use crate::algorithms::period::estimate_period;
use crate::algorithms::stats;
use crate::models::{DetectionSummary, TransitCandidate};

/// Summarize candidates into depth, duration and period estimates.
///
/// Depth and duration are medians over all candidates (0.0 when there are
/// none). Candidates are reordered by start time before the period is
/// estimated.
pub fn summarize(mut candidates: Vec<TransitCandidate>) -> DetectionSummary {
    candidates.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let depths: Vec<f64> = candidates.iter().map(|c| c.depth).collect();
    let durations: Vec<f64> = candidates.iter().map(TransitCandidate::duration).collect();
    let starts: Vec<f64> = candidates.iter().map(|c| c.start_time).collect();

    DetectionSummary {
        orbital_period_estimate: estimate_period(&starts),
        transit_depth: stats::median(&depths).unwrap_or(0.0),
        transit_duration: stats::median(&durations).unwrap_or(0.0),
        candidate_count: candidates.len(),
        candidates,
    }
}
