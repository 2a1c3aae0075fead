//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::classifier::TransitClassifier;
use crate::services::job_tracker::JobTracker;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration (pipeline defaults and limits)
    pub config: Arc<AppConfig>,
    /// Background analysis jobs
    pub job_tracker: JobTracker,
    /// External transit classifier; reports stay unclassified without one
    pub classifier: Option<Arc<dyn TransitClassifier>>,
}

impl AppState {
    /// Create a new application state with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let job_tracker = JobTracker::with_capacity(config.limits.max_retained_jobs);
        Self {
            config: Arc::new(config),
            job_tracker,
            classifier: None,
        }
    }

    /// Attach the classifier consulted after each analysis.
    pub fn with_classifier(mut self, classifier: Arc<dyn TransitClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
