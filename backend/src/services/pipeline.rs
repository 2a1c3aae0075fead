//! Detection pipeline driver.
//!
//! Chains parse → validate → normalize → detect → summarize. Every stage
//! takes the previous stage's output by value or reference and returns a new
//! value; the first failure short-circuits the run. Callers that want
//! progress pass a [`StageObserver`], which receives one [`StageEvent`] as
//! each stage completes.

use std::fmt;
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithms::{detect_candidates, summarize};
use crate::config::PipelineDefaults;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{DetectionSummary, LightCurve, NormalizedCurve};
use crate::parsing;
use crate::preprocessing::{default_window, normalize, validate, MIN_WINDOW};
use crate::services::classifier::ClassifierInput;

/// Caller-supplied overrides. Unset fields fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOptions {
    pub depth_threshold: Option<f64>,
    pub min_duration_samples: Option<usize>,
    pub normalize_window: Option<usize>,
}

impl PipelineOptions {
    /// Reject explicit values that cannot be honored.
    pub fn validate(&self) -> PipelineResult<()> {
        if let Some(threshold) = self.depth_threshold {
            if !(threshold.is_finite() && threshold > 0.0 && threshold < 1.0) {
                return Err(PipelineError::InvalidOptions(format!(
                    "depth threshold must be in (0, 1), got {}",
                    threshold
                )));
            }
        }
        if self.min_duration_samples == Some(0) {
            return Err(PipelineError::InvalidOptions(
                "minimum duration must be at least 1 sample".to_string(),
            ));
        }
        if let Some(window) = self.normalize_window {
            if window < MIN_WINDOW || window % 2 == 0 {
                return Err(PipelineError::InvalidOptions(format!(
                    "normalization window must be odd and at least {}, got {}",
                    MIN_WINDOW, window
                )));
            }
        }
        Ok(())
    }
}

/// Fully resolved detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionParams {
    pub depth_threshold: f64,
    pub min_duration_samples: usize,
    /// `None` derives the window from the curve's cadence.
    pub normalize_window: Option<usize>,
}

impl DetectionParams {
    /// Merge request options over configured defaults and validate the result.
    pub fn resolve(options: &PipelineOptions, defaults: &PipelineDefaults) -> PipelineResult<Self> {
        let merged = PipelineOptions {
            depth_threshold: options.depth_threshold.or(Some(defaults.depth_threshold)),
            min_duration_samples: options
                .min_duration_samples
                .or(Some(defaults.min_duration_samples)),
            normalize_window: options.normalize_window.or(defaults.normalize_window),
        };
        merged.validate()?;

        Ok(Self {
            depth_threshold: merged.depth_threshold.unwrap_or(defaults.depth_threshold),
            min_duration_samples: merged
                .min_duration_samples
                .unwrap_or(defaults.min_duration_samples),
            normalize_window: merged.normalize_window,
        })
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        let defaults = PipelineDefaults::default();
        Self {
            depth_threshold: defaults.depth_threshold,
            min_duration_samples: defaults.min_duration_samples,
            normalize_window: defaults.normalize_window,
        }
    }
}

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Parse,
    Validate,
    Normalize,
    Detect,
    Summarize,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Parse,
        PipelineStage::Validate,
        PipelineStage::Normalize,
        PipelineStage::Detect,
        PipelineStage::Summarize,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Parse => "Parsing light curve",
            PipelineStage::Validate => "Validating samples",
            PipelineStage::Normalize => "Normalizing flux",
            PipelineStage::Detect => "Detecting transit candidates",
            PipelineStage::Summarize => "Summarizing detections",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Emitted once when a stage finishes successfully.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    pub stage: PipelineStage,
    pub elapsed_ms: f64,
    pub detail: String,
}

/// Receives stage-completion events.
pub trait StageObserver {
    fn on_stage_complete(&self, event: &StageEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage_complete(&self, _event: &StageEvent) {}
}

impl<F> StageObserver for F
where
    F: Fn(&StageEvent),
{
    fn on_stage_complete(&self, event: &StageEvent) {
        self(event)
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Validated, time-sorted input.
    pub raw: LightCurve,
    pub curve: NormalizedCurve,
    pub summary: DetectionSummary,
    pub elapsed_ms: f64,
}

impl PipelineRun {
    /// Features handed to an external classifier.
    pub fn classifier_input(&self) -> ClassifierInput {
        ClassifierInput::new(&self.summary, &self.curve)
    }
}

/// Configured detection pipeline.
#[derive(Debug, Clone, Default)]
pub struct DetectionPipeline {
    params: DetectionParams,
}

impl DetectionPipeline {
    pub fn new(params: DetectionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Run the pipeline and return only the summary.
    pub fn run(&self, raw_text: &str) -> PipelineResult<DetectionSummary> {
        self.run_with_observer(raw_text, &NoopObserver)
            .map(|run| run.summary)
    }

    /// Run the pipeline, reporting each completed stage to `observer`.
    pub fn run_with_observer(
        &self,
        raw_text: &str,
        observer: &dyn StageObserver,
    ) -> PipelineResult<PipelineRun> {
        let started = Instant::now();
        let mut stage_started = Instant::now();
        let mut complete = |stage: PipelineStage, detail: String| {
            let event = StageEvent {
                stage,
                elapsed_ms: stage_started.elapsed().as_secs_f64() * 1000.0,
                detail,
            };
            debug!("{} done in {:.2} ms: {}", stage, event.elapsed_ms, event.detail);
            observer.on_stage_complete(&event);
            stage_started = Instant::now();
        };

        let parsed = parsing::parse(raw_text)?;
        complete(
            PipelineStage::Parse,
            format!("Parsed {} samples ({})", parsed.len(), parsed.source_id()),
        );

        let raw = validate(parsed)?;
        complete(
            PipelineStage::Validate,
            format!(
                "Validated {} samples, {} discontinuities",
                raw.len(),
                raw.discontinuities().len()
            ),
        );

        let window = self
            .params
            .normalize_window
            .unwrap_or_else(|| default_window(raw.cadence_seconds()));
        let curve = normalize(&raw, window);
        complete(
            PipelineStage::Normalize,
            format!(
                "Normalized flux with a {}-sample window (cadence {:.1} s)",
                curve.window(),
                curve.cadence_seconds()
            ),
        );

        let candidates = detect_candidates(
            &curve,
            self.params.depth_threshold,
            self.params.min_duration_samples,
        );
        complete(
            PipelineStage::Detect,
            format!("Found {} transit candidates", candidates.len()),
        );

        let summary = summarize(candidates);
        complete(
            PipelineStage::Summarize,
            match summary.orbital_period_estimate {
                Some(period) => format!("Estimated orbital period {:.4} days", period),
                None => "No orbital period estimate".to_string(),
            },
        );

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            "Pipeline finished for {}: {} samples, {} candidates in {:.1} ms",
            raw.source_id(),
            raw.len(),
            summary.candidate_count,
            elapsed_ms
        );

        Ok(PipelineRun {
            raw,
            curve,
            summary,
            elapsed_ms,
        })
    }
}

/// Run the full pipeline with default settings and optional overrides.
///
/// # Examples
///
/// ```
/// use exo_transit::services::pipeline::run_detection_pipeline;
///
/// let mut csv = String::from("time,flux\n");
/// for i in 0..100 {
///     csv.push_str(&format!("{},1.0\n", i as f64 * 0.02));
/// }
///
/// let summary = run_detection_pipeline(&csv, None).unwrap();
/// assert_eq!(summary.candidate_count, 0);
/// ```
pub fn run_detection_pipeline(
    raw_text: &str,
    options: Option<&PipelineOptions>,
) -> PipelineResult<DetectionSummary> {
    let params = DetectionParams::resolve(
        &options.cloned().unwrap_or_default(),
        &PipelineDefaults::default(),
    )?;
    DetectionPipeline::new(params).run(raw_text)
}
