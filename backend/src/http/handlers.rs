//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer. Pipeline work runs on the blocking pool.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::sse::{Event, Sse},
    response::IntoResponse,
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::dto::{
    AnalyzeQuery, CreateJobResponse, DetectionReport, HealthResponse, JobStatusResponse,
    SampleQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::services::analysis_processor::{self, process_analysis_async, AnalysisRequest};
use crate::services::job_tracker::JobStatus;
use crate::services::pipeline::{DetectionParams, NoopObserver};
use crate::services::synthetic::{generate, to_csv, SyntheticCurveSpec};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Most transits a generated sample may contain.
const MAX_SAMPLE_TRANSITS: usize = 50;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check() -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

// =============================================================================
// Analysis
// =============================================================================

/// Resolve query options against the configured defaults.
fn analysis_request(state: &AppState, query: &AnalyzeQuery) -> Result<AnalysisRequest, AppError> {
    let params = DetectionParams::resolve(&query.options(), &state.config.pipeline)?;
    let mut request = AnalysisRequest::new(params)
        .with_preview(query.preview)
        .with_mission(query.mission)
        .with_classifier(state.classifier.clone());
    if let Some(radius) = query.stellar_radius {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(AppError::BadRequest(format!(
                "stellarRadius must be positive, got {}",
                radius
            )));
        }
        request.stellar_radius_solar = radius;
    }
    Ok(request)
}

/// POST /v1/analyze
///
/// Run the detection pipeline over a CSV body and return the report,
/// classified when a classifier is configured.
pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    body: String,
) -> HandlerResult<DetectionReport> {
    let request = analysis_request(&state, &query)?;
    let classifier = request.classifier.clone();

    let analysis = tokio::task::spawn_blocking(move || {
        analysis_processor::analyze(&body, &request, &NoopObserver)
    })
    .await??;
    let report = analysis.classify(classifier.as_deref()).await;

    Ok(Json(report))
}

/// POST /v1/jobs
///
/// Start a background analysis. Returns a job ID for tracking progress.
pub async fn create_job(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    body: String,
) -> Result<(StatusCode, Json<CreateJobResponse>), AppError> {
    let request = analysis_request(&state, &query)?;

    let job_id = state.job_tracker.create_job();
    let response_job_id = job_id.clone();

    let tracker = state.job_tracker.clone();
    tokio::spawn(async move {
        let _ = process_analysis_async(job_id, tracker, body, request).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateJobResponse {
            job_id: response_job_id.clone(),
            message: format!(
                "Analysis started. Track progress at /v1/jobs/{}/logs",
                response_job_id
            ),
        }),
    ))
}

// =============================================================================
// Sample Data
// =============================================================================

/// GET /v1/sample
///
/// Download a synthetic light curve as CSV.
pub async fn get_sample(Query(query): Query<SampleQuery>) -> Result<impl IntoResponse, AppError> {
    let mut spec = match query.transits {
        Some(count) if count > MAX_SAMPLE_TRANSITS => {
            return Err(AppError::BadRequest(format!(
                "transits must be at most {}",
                MAX_SAMPLE_TRANSITS
            )));
        }
        Some(count) => SyntheticCurveSpec::periodic(1.5, 3.0, 0.2, 0.015, count),
        None => SyntheticCurveSpec::default(),
    };
    if let Some(seed) = query.seed {
        spec = spec.with_seed(seed);
    }

    let csv = to_csv(&generate(&spec))
        .map_err(|e| AppError::Internal(format!("Failed to render sample CSV: {}", e)))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sample-light-curve.csv\"",
            ),
        ],
        csv,
    ))
}

// =============================================================================
// Async Job Management
// =============================================================================

/// GET /v1/jobs/{job_id}
///
/// Get the current status and logs of a background job.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobStatusResponse> {
    let job = state
        .job_tracker
        .get_job(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(job.into()))
}

/// GET /v1/jobs/{job_id}/logs
///
/// Stream job logs via Server-Sent Events (SSE).
pub async fn stream_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.job_tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    let tracker = state.job_tracker.clone();
    let stream = async_stream::stream! {
        let mut last_log_count = 0;
        loop {
            let logs = tracker.get_logs(&job_id);

            for log in logs.iter().skip(last_log_count) {
                let event_data = serde_json::to_string(log).unwrap_or_default();
                yield Ok(Event::default().data(event_data));
            }
            last_log_count = logs.len();

            if let Some(job) = tracker.get_job(&job_id) {
                if job.status != JobStatus::Running {
                    let final_event = serde_json::json!({
                        "status": job.status,
                        "result": job.result,
                    });
                    yield Ok(Event::default()
                        .event("complete")
                        .data(serde_json::to_string(&final_event).unwrap_or_default()));
                    break;
                }
            } else {
                break;
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
