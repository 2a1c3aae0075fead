//! Numerical core of the detection pipeline.
//!
//! - [`stats`]: Medians, means and robust scatter
//! - [`detection`]: Flag sustained flux dips as transit candidates
//! - [`period`]: Estimate the orbital period from candidate spacing
//! - [`summary`]: Aggregate candidates into a [`DetectionSummary`]
//!
//! [`DetectionSummary`]: crate::models::DetectionSummary

pub mod detection;
pub mod period;
pub mod stats;
pub mod summary;

pub use detection::{detect_candidates, DEFAULT_DEPTH_THRESHOLD, DEFAULT_MIN_DURATION_SAMPLES};
pub use period::estimate_period;
pub use summary::summarize;
