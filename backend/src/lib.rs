//! # Exo Transit
//!
//! Light-curve ingestion and transit-candidate detection engine.
//!
//! This crate turns raw photometric time series into transit candidates:
//! it parses delimited text, rejects physically implausible curves,
//! detrends the flux to a unit baseline, flags sustained dips and summarizes
//! them into depth, duration and orbital period estimates. A REST API via
//! Axum and a command-line tool sit on top.
//!
//! ## Features
//!
//! - **Parsing**: `time,flux[,flux_error]` CSV with per-row skip accounting
//! - **Preprocessing**: Validation, rolling-median detrending and normalization
//! - **Detection**: Run/merge/qualify candidate search and period estimation
//! - **Reports**: Planet properties, classifier seam and JSON export
//! - **HTTP API**: Synchronous analysis and background jobs with SSE logs
//!
//! ## Architecture
//!
//! - [`error`]: Typed errors for every pipeline stage
//! - [`models`]: Light curves, candidates and summaries
//! - [`parsing`]: Record parser and content checksums
//! - [`preprocessing`]: Validator and normalizer
//! - [`algorithms`]: Statistics, detection, period estimation, summary
//! - [`services`]: Pipeline driver, jobs, reports, synthetic data
//! - [`config`]: TOML configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```
//! use exo_transit::services::synthetic::{generate, to_csv, SyntheticCurveSpec};
//! use exo_transit::run_detection_pipeline;
//!
//! let csv = to_csv(&generate(&SyntheticCurveSpec::default())).unwrap();
//! let summary = run_detection_pipeline(&csv, None).unwrap();
//! assert!(summary.candidate_count >= 1);
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod parsing;
pub mod preprocessing;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{ParseError, PipelineError, PipelineResult, ValidationError};
pub use services::pipeline::{run_detection_pipeline, PipelineOptions};
