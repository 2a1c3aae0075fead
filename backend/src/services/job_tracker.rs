//! Job tracking for background light-curve analysis.
//!
//! An in-memory store of job status and progress logs. Log entries are
//! appended as pipeline stages complete, so streamed progress always
//! reflects real work.
//!
//! The tracker retains at most `capacity` jobs. Once over capacity the
//! oldest finished jobs are evicted first; running jobs are never evicted.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

use crate::services::pipeline::{PipelineStage, StageEvent, StageObserver};

/// A single log entry with timestamp and message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Stage that produced the entry, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Job status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Job metadata and logs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub logs: Vec<LogEntry>,
    /// Pipeline stages finished so far.
    pub completed_stages: Vec<PipelineStage>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Detection report when the job succeeded.
    pub result: Option<serde_json::Value>,
}

impl Job {
    /// Fraction of pipeline stages completed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.status == JobStatus::Completed {
            return 1.0;
        }
        self.completed_stages.len() as f64 / PipelineStage::ALL.len() as f64
    }
}

/// Jobs retained when no capacity is configured.
pub const DEFAULT_JOB_CAPACITY: usize = 256;

#[derive(Default)]
struct JobStore {
    jobs: HashMap<String, Job>,
    /// Finished job IDs, oldest first.
    finished: VecDeque<String>,
}

impl JobStore {
    /// Move a running job to `status`. Finished jobs are left untouched.
    fn finish(&mut self, job_id: &str, status: JobStatus) -> Option<&mut Job> {
        let job = self.jobs.get_mut(job_id)?;
        if job.status != JobStatus::Running {
            return None;
        }
        job.status = status;
        job.completed_at = Some(chrono::Utc::now());
        self.finished.push_back(job_id.to_string());
        self.jobs.get_mut(job_id)
    }

    fn evict(&mut self, capacity: usize) {
        while self.jobs.len() > capacity {
            let Some(oldest) = self.finished.pop_front() else {
                break;
            };
            self.jobs.remove(&oldest);
            log::debug!("Evicted finished job {}", oldest);
        }
    }
}

/// In-memory job tracker.
#[derive(Clone)]
pub struct JobTracker {
    store: Arc<RwLock<JobStore>>,
    capacity: usize,
}

impl JobTracker {
    /// Create a new job tracker.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_JOB_CAPACITY)
    }

    /// Create a tracker that retains at most `capacity` jobs (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(JobStore::default())),
            capacity: capacity.max(1),
        }
    }

    /// Number of jobs currently retained.
    pub fn len(&self) -> usize {
        self.store.read().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a new job and return its ID.
    pub fn create_job(&self) -> String {
        let job_id = Uuid::new_v4().to_string();
        let job = Job {
            job_id: job_id.clone(),
            status: JobStatus::Running,
            logs: vec![],
            completed_stages: vec![],
            created_at: chrono::Utc::now(),
            completed_at: None,
            result: None,
        };
        let mut store = self.store.write();
        store.jobs.insert(job_id.clone(), job);
        store.evict(self.capacity);
        job_id
    }

    /// Add a log entry to a job.
    pub fn log(&self, job_id: &str, level: LogLevel, message: impl Into<String>) {
        self.push(job_id, level, message.into(), None);
    }

    /// Record a completed pipeline stage.
    pub fn stage_completed(&self, job_id: &str, event: &StageEvent) {
        let message = format!("✓ {} ({:.1} ms): {}", event.stage, event.elapsed_ms, event.detail);
        let mut store = self.store.write();
        if let Some(job) = store.jobs.get_mut(job_id) {
            job.completed_stages.push(event.stage);
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level: LogLevel::Success,
                message,
                stage: Some(event.stage),
            });
        }
    }

    /// Mark a job as completed with optional result.
    pub fn complete_job(&self, job_id: &str, result: Option<serde_json::Value>) {
        let mut store = self.store.write();
        if let Some(job) = store.finish(job_id, JobStatus::Completed) {
            job.result = result;
        }
        store.evict(self.capacity);
    }

    /// Mark a job as failed.
    pub fn fail_job(&self, job_id: &str, error_message: impl Into<String>) {
        let mut store = self.store.write();
        if let Some(job) = store.finish(job_id, JobStatus::Failed) {
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level: LogLevel::Error,
                message: error_message.into(),
                stage: None,
            });
        }
        store.evict(self.capacity);
    }

    /// Get a job by ID.
    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.store.read().jobs.get(job_id).cloned()
    }

    /// Get all logs for a job.
    pub fn get_logs(&self, job_id: &str) -> Vec<LogEntry> {
        self.store
            .read()
            .jobs
            .get(job_id)
            .map(|job| job.logs.clone())
            .unwrap_or_default()
    }

    fn push(&self, job_id: &str, level: LogLevel, message: String, stage: Option<PipelineStage>) {
        let mut store = self.store.write();
        if let Some(job) = store.jobs.get_mut(job_id) {
            job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level,
                message,
                stage,
            });
        }
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards pipeline stage events into a job's log.
pub struct JobStageLogger<'a> {
    tracker: &'a JobTracker,
    job_id: &'a str,
}

impl<'a> JobStageLogger<'a> {
    pub fn new(tracker: &'a JobTracker, job_id: &'a str) -> Self {
        Self { tracker, job_id }
    }
}

impl StageObserver for JobStageLogger<'_> {
    fn on_stage_complete(&self, event: &StageEvent) {
        self.tracker.stage_completed(self.job_id, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(stage: PipelineStage) -> StageEvent {
        StageEvent {
            stage,
            elapsed_ms: 1.5,
            detail: "done".to_string(),
        }
    }

    #[test]
    fn test_job_lifecycle() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job();

        tracker.log(&job_id, LogLevel::Info, "Starting analysis...");
        let job = tracker.get_job(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress(), 0.0);

        tracker.complete_job(&job_id, Some(serde_json::json!({"ok": true})));
        let job = tracker.get_job(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert_eq!(job.progress(), 1.0);
    }

    #[test]
    fn test_stage_logger_records_progress() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job();
        let logger = JobStageLogger::new(&tracker, &job_id);

        logger.on_stage_complete(&event(PipelineStage::Parse));
        logger.on_stage_complete(&event(PipelineStage::Validate));

        let job = tracker.get_job(&job_id).unwrap();
        assert_eq!(
            job.completed_stages,
            vec![PipelineStage::Parse, PipelineStage::Validate]
        );
        assert!((job.progress() - 0.4).abs() < 1e-12);
        assert_eq!(job.logs[1].stage, Some(PipelineStage::Validate));
    }

    #[test]
    fn test_fail_job_appends_error() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job();
        tracker.fail_job(&job_id, "insufficient data");

        let logs = tracker.get_logs(&job_id);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, LogLevel::Error);
        assert_eq!(tracker.get_job(&job_id).unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn test_unknown_job() {
        let tracker = JobTracker::new();
        assert!(tracker.get_job("missing").is_none());
        assert!(tracker.get_logs("missing").is_empty());
    }

    #[test]
    fn test_oldest_finished_jobs_evicted() {
        let tracker = JobTracker::with_capacity(2);
        let first = tracker.create_job();
        let second = tracker.create_job();
        tracker.complete_job(&second, None);
        tracker.fail_job(&first, "bad input");

        let third = tracker.create_job();
        assert_eq!(tracker.len(), 2);
        assert!(tracker.get_job(&second).is_none());
        assert_eq!(tracker.get_job(&first).unwrap().status, JobStatus::Failed);

        tracker.complete_job(&third, None);
        tracker.create_job();
        assert_eq!(tracker.len(), 2);
        assert!(tracker.get_job(&first).is_none());
        assert!(tracker.get_job(&third).is_some());
    }

    #[test]
    fn test_running_jobs_never_evicted() {
        let tracker = JobTracker::with_capacity(2);
        let running: Vec<String> = (0..4).map(|_| tracker.create_job()).collect();
        assert_eq!(tracker.len(), 4);

        tracker.complete_job(&running[0], None);
        assert_eq!(tracker.len(), 3);
        assert!(tracker.get_job(&running[0]).is_none());
        assert!(running[1..].iter().all(|id| tracker.get_job(id).is_some()));
    }

    #[test]
    fn test_repeated_completion_counted_once() {
        let tracker = JobTracker::with_capacity(1);
        let job_id = tracker.create_job();
        tracker.complete_job(&job_id, None);
        tracker.fail_job(&job_id, "late failure");

        let job = tracker.get_job(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.logs.is_empty());
        assert_eq!(tracker.len(), 1);
    }
}
