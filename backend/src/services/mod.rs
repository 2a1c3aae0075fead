//! Service layer for orchestration around the detection pipeline.
//!
//! These services sit between the pipeline stages and the outer surfaces
//! (HTTP server, CLI). They chain the stages, track background jobs and
//! assemble exportable reports.

pub mod analysis_processor;
pub mod classifier;
pub mod job_tracker;
pub mod pipeline;
pub mod properties;
pub mod report;
pub mod synthetic;

pub use analysis_processor::{analyze, analyze_text, process_analysis_async, Analysis, AnalysisRequest};
pub use classifier::{
    Classification, ClassifierError, ClassifierInput, ConfidenceTier, TransitClassifier,
};
pub use job_tracker::{Job, JobStageLogger, JobStatus, JobTracker, LogEntry, LogLevel};
pub use pipeline::{
    run_detection_pipeline, DetectionParams, DetectionPipeline, NoopObserver, PipelineOptions,
    PipelineRun, PipelineStage, StageEvent, StageObserver,
};
pub use properties::PlanetProperties;
pub use report::{ChartPoint, DetectionReport, Mission};
pub use synthetic::{SyntheticCurveSpec, SyntheticTransit};
