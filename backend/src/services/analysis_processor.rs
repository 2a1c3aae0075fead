//! Light-curve analysis service.
//!
//! Wraps the detection pipeline into a complete [`DetectionReport`] and runs
//! it either inline or as a tracked background job. When a
//! [`TransitClassifier`] is configured, its verdict is attached after the
//! pipeline finishes.

use std::sync::Arc;

use log::{info, warn};

use crate::error::PipelineResult;
use crate::parsing::calculate_checksum;
use crate::services::classifier::TransitClassifier;
use crate::services::job_tracker::{JobStageLogger, JobTracker, LogLevel};
use crate::services::pipeline::{DetectionParams, DetectionPipeline, PipelineRun, StageObserver};
use crate::services::properties::DEFAULT_STELLAR_RADIUS;
use crate::services::report::{DetectionReport, Mission};

/// What to compute for one uploaded light curve.
#[derive(Clone)]
pub struct AnalysisRequest {
    pub params: DetectionParams,
    /// Points in the chart preview; `None` omits it.
    pub preview_points: Option<usize>,
    pub stellar_radius_solar: f64,
    /// Mission the light curve came from, if the caller said.
    pub mission: Option<Mission>,
    pub classifier: Option<Arc<dyn TransitClassifier>>,
}

impl AnalysisRequest {
    pub fn new(params: DetectionParams) -> Self {
        Self {
            params,
            preview_points: None,
            stellar_radius_solar: DEFAULT_STELLAR_RADIUS,
            mission: None,
            classifier: None,
        }
    }

    pub fn with_preview(mut self, points: Option<usize>) -> Self {
        self.preview_points = points;
        self
    }

    pub fn with_mission(mut self, mission: Option<Mission>) -> Self {
        self.mission = mission;
        self
    }

    pub fn with_classifier(mut self, classifier: Option<Arc<dyn TransitClassifier>>) -> Self {
        self.classifier = classifier;
        self
    }
}

/// A finished pipeline run and the report built from it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: DetectionReport,
    pub run: PipelineRun,
}

impl Analysis {
    /// Attach the classifier's verdict to the report.
    ///
    /// A failing classifier leaves the report unclassified; the detection
    /// result stands on its own.
    pub async fn classify(self, classifier: Option<&dyn TransitClassifier>) -> DetectionReport {
        let Some(classifier) = classifier else {
            return self.report;
        };

        match classifier.classify(&self.run.classifier_input()).await {
            Ok(classification) => self.report.with_classification(classification),
            Err(e) => {
                warn!("Classifier failed for {}: {}", self.report.source_id, e);
                self.report
            }
        }
    }
}

/// Run the pipeline over `raw_text`, keeping the run for classification.
pub fn analyze(
    raw_text: &str,
    request: &AnalysisRequest,
    observer: &dyn StageObserver,
) -> PipelineResult<Analysis> {
    let pipeline = DetectionPipeline::new(request.params.clone());
    let run = pipeline.run_with_observer(raw_text, observer)?;

    let mut report = DetectionReport::new(
        &run,
        calculate_checksum(raw_text),
        request.stellar_radius_solar,
    )
    .with_mission(request.mission);
    if let Some(points) = request.preview_points {
        report = report.with_preview(&run, points);
    }
    Ok(Analysis { report, run })
}

/// Run the pipeline over `raw_text` and build the report.
pub fn analyze_text(
    raw_text: &str,
    request: &AnalysisRequest,
    observer: &dyn StageObserver,
) -> PipelineResult<DetectionReport> {
    analyze(raw_text, request, observer).map(|analysis| analysis.report)
}

/// Analyze a light curve in the background, logging each stage to the job.
///
/// Designed to be spawned as a task. The pipeline itself runs on the
/// blocking pool.
pub async fn process_analysis_async(
    job_id: String,
    tracker: JobTracker,
    raw_text: String,
    request: AnalysisRequest,
) -> Result<DetectionReport, String> {
    tracker.log(
        &job_id,
        LogLevel::Info,
        format!("Starting analysis of {} bytes...", raw_text.len()),
    );

    let classifier = request.classifier.clone();
    let outcome = tokio::task::spawn_blocking({
        let tracker = tracker.clone();
        let job_id = job_id.clone();
        move || {
            let logger = JobStageLogger::new(&tracker, &job_id);
            analyze(&raw_text, &request, &logger)
        }
    })
    .await;

    let analysis = match outcome {
        Ok(Ok(analysis)) => analysis,
        Ok(Err(e)) => {
            let msg = format!("Analysis failed at {} stage: {}", e.stage(), e);
            warn!("Job {}: {}", job_id, msg);
            tracker.fail_job(&job_id, &msg);
            return Err(msg);
        }
        Err(e) => {
            let msg = format!("Analysis task panic: {}", e);
            tracker.fail_job(&job_id, &msg);
            return Err(msg);
        }
    };

    if classifier.is_some() {
        tracker.log(&job_id, LogLevel::Info, "Classifying transit candidates...");
    }
    let report = analysis.classify(classifier.as_deref()).await;
    if let Some(classification) = &report.classification {
        tracker.log(
            &job_id,
            LogLevel::Info,
            format!(
                "Classified as {} ({:.0}% confidence). {}",
                classification.label,
                classification.confidence,
                classification.tier().description()
            ),
        );
    }

    let result = match serde_json::to_value(&report) {
        Ok(value) => value,
        Err(e) => {
            let msg = format!("Failed to serialize report: {}", e);
            tracker.fail_job(&job_id, &msg);
            return Err(msg);
        }
    };

    tracker.log(
        &job_id,
        LogLevel::Success,
        format!(
            "✅ Analysis complete: {} transit candidates in {}",
            report.summary.candidate_count, report.source_id
        ),
    );
    tracker.complete_job(&job_id, Some(result));
    info!("Job {} completed for {}", job_id, report.source_id);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::services::classifier::{Classification, ClassifierError, ClassifierInput};
    use crate::services::job_tracker::JobStatus;
    use crate::services::pipeline::NoopObserver;
    use crate::services::synthetic::{generate, to_csv, SyntheticCurveSpec};

    /// Scores by candidate count; fails when asked about an empty curve.
    struct CountingClassifier;

    #[async_trait]
    impl TransitClassifier for CountingClassifier {
        async fn classify(
            &self,
            input: &ClassifierInput,
        ) -> Result<Classification, ClassifierError> {
            if input.normalized_flux_series.is_empty() {
                return Err(ClassifierError::Unavailable("empty series".to_string()));
            }
            let confidence = (input.candidates.len() as f64 * 30.0).min(100.0);
            Classification::new(confidence, Classification::label_for(confidence))
        }
    }

    struct OfflineClassifier;

    #[async_trait]
    impl TransitClassifier for OfflineClassifier {
        async fn classify(
            &self,
            _input: &ClassifierInput,
        ) -> Result<Classification, ClassifierError> {
            Err(ClassifierError::Unavailable("model offline".to_string()))
        }
    }

    fn three_transit_request() -> (String, AnalysisRequest) {
        let csv = to_csv(&generate(
            &SyntheticCurveSpec::periodic(1.5, 3.0, 0.2, 0.015, 3).with_seed(5),
        ))
        .unwrap();
        let params = DetectionParams {
            depth_threshold: 0.005,
            ..DetectionParams::default()
        };
        (csv, AnalysisRequest::new(params))
    }

    #[test]
    fn test_analyze_text_builds_report() {
        let csv = to_csv(&generate(&SyntheticCurveSpec::default())).unwrap();
        let request = AnalysisRequest::new(DetectionParams::default()).with_preview(Some(50));

        let report = analyze_text(&csv, &request, &NoopObserver).unwrap();
        assert_eq!(report.checksum, calculate_checksum(&csv));
        assert_eq!(report.preview.as_ref().map(Vec::len), Some(50));
        assert_eq!(report.classification, None);
        assert_eq!(report.mission, None);
    }

    #[tokio::test]
    async fn test_classifier_verdict_attached() {
        let (csv, request) = three_transit_request();
        let request = request.with_mission(Some(Mission::Tess));

        let classifier: &dyn TransitClassifier = &CountingClassifier;
        let analysis = analyze(&csv, &request, &NoopObserver).unwrap();
        let report = analysis.classify(Some(classifier)).await;

        let classification = report.classification.unwrap();
        assert_eq!(classification.confidence, 90.0);
        assert_eq!(classification.label, "Confirmed Exoplanet");
        assert_eq!(report.mission, Some(Mission::Tess));
    }

    #[tokio::test]
    async fn test_classifier_failure_keeps_detection() {
        let (csv, request) = three_transit_request();

        let classifier: &dyn TransitClassifier = &OfflineClassifier;
        let analysis = analyze(&csv, &request, &NoopObserver).unwrap();
        let report = analysis.classify(Some(classifier)).await;

        assert_eq!(report.classification, None);
        assert_eq!(report.summary.candidate_count, 3);
    }

    #[tokio::test]
    async fn test_background_job_logs_every_stage() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job();
        let csv = to_csv(&generate(&SyntheticCurveSpec::default())).unwrap();

        let report = process_analysis_async(
            job_id.clone(),
            tracker.clone(),
            csv,
            AnalysisRequest::new(DetectionParams::default()),
        )
        .await
        .unwrap();

        let job = tracker.get_job(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.completed_stages.len(), 5);
        assert_eq!(
            job.result.unwrap()["summary"]["candidateCount"],
            report.summary.candidate_count
        );
    }

    #[tokio::test]
    async fn test_background_job_classifies() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job();
        let (csv, request) = three_transit_request();
        let classifier: Arc<dyn TransitClassifier> = Arc::new(CountingClassifier);
        let request = request.with_classifier(Some(classifier));

        let report = process_analysis_async(job_id.clone(), tracker.clone(), csv, request)
            .await
            .unwrap();
        assert!(report.classification.is_some());

        let job = tracker.get_job(&job_id).unwrap();
        assert_eq!(job.result.unwrap()["classification"]["confidence"], 90.0);
        assert!(job
            .logs
            .iter()
            .any(|entry| entry.message.starts_with("Classified as Confirmed Exoplanet")));
    }

    #[tokio::test]
    async fn test_background_job_failure() {
        let tracker = JobTracker::new();
        let job_id = tracker.create_job();

        let err = process_analysis_async(
            job_id.clone(),
            tracker.clone(),
            "time,flux\n0.0,1.0\n".to_string(),
            AnalysisRequest::new(DetectionParams::default()),
        )
        .await
        .unwrap_err();

        assert!(err.contains("parse"));
        let job = tracker.get_job(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.completed_stages.is_empty());
    }
}
