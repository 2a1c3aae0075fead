//! Data Transfer Objects for the HTTP API.
//!
//! Request query strings and response bodies use camelCase names. Report
//! bodies reuse the service-layer types directly since they already derive
//! Serialize.

use serde::{Deserialize, Serialize};

use crate::services::job_tracker::{Job, JobStatus, LogEntry};
use crate::services::pipeline::PipelineOptions;
use crate::services::report::Mission;

pub use crate::services::report::DetectionReport;

/// Query parameters for `POST /v1/analyze` and `POST /v1/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeQuery {
    /// Fractional dip depth threshold, in (0, 1)
    #[serde(default)]
    pub depth_threshold: Option<f64>,
    /// Minimum in-dip samples per candidate
    #[serde(default)]
    pub min_duration_samples: Option<usize>,
    /// Rolling-median window (odd, at least 5)
    #[serde(default)]
    pub normalize_window: Option<usize>,
    /// Include a chart preview with at most this many points
    #[serde(default)]
    pub preview: Option<usize>,
    /// Host star radius in solar radii (default: 1.0)
    #[serde(default)]
    pub stellar_radius: Option<f64>,
    /// Mission the curve came from (kepler, tess or custom)
    #[serde(default)]
    pub mission: Option<Mission>,
}

impl AnalyzeQuery {
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            depth_threshold: self.depth_threshold,
            min_duration_samples: self.min_duration_samples,
            normalize_window: self.normalize_window,
        }
    }
}

/// Response for job creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    /// Job ID for tracking the background analysis
    pub job_id: String,
    /// Message about the operation
    pub message: String,
}

/// Job status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    /// Fraction of pipeline stages completed
    pub progress: f64,
    pub logs: Vec<LogEntry>,
    /// Detection report if completed
    pub result: Option<serde_json::Value>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            progress: job.progress(),
            job_id: job.job_id,
            status: job.status,
            logs: job.logs,
            result: job.result,
        }
    }
}

/// Query parameters for `GET /v1/sample`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SampleQuery {
    /// Noise seed (default: 42)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of evenly spaced transits; the single-transit sample when absent
    #[serde(default)]
    pub transits: Option<usize>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
}
