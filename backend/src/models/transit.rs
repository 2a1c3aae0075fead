//! Transit candidates and the detection summary handed back to callers.

use serde::{Deserialize, Serialize};

/// A sustained flux dip that may be a planetary transit.
///
/// Times are in days, `depth` is the fractional flux decrease and
/// `significance` is depth over the mean flux error of the dip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitCandidate {
    pub start_time: f64,
    pub end_time: f64,
    pub depth: f64,
    pub significance: f64,
}

impl TransitCandidate {
    /// Length of the dip in days.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Aggregated outcome of a detection run.
///
/// Zero candidates is a valid result: `candidate_count` is 0, depth and
/// duration are 0 and the period is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub orbital_period_estimate: Option<f64>,
    pub transit_depth: f64,
    /// Median candidate duration in days.
    pub transit_duration: f64,
    pub candidate_count: usize,
    pub candidates: Vec<TransitCandidate>,
}

impl DetectionSummary {
    pub fn has_candidates(&self) -> bool {
        self.candidate_count > 0
    }
}
