//! Exportable detection report.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DetectionSummary, LightCurve, NormalizedCurve};
use crate::services::classifier::Classification;
use crate::services::pipeline::PipelineRun;
use crate::services::properties::PlanetProperties;

/// Survey that produced an uploaded light curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mission {
    Kepler,
    Tess,
    /// Anything else in the `time,flux[,flux_err]` layout.
    Custom,
}

impl Mission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mission::Kepler => "kepler",
            Mission::Tess => "tess",
            Mission::Custom => "custom",
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kepler" => Ok(Mission::Kepler),
            "tess" => Ok(Mission::Tess),
            "custom" => Ok(Mission::Custom),
            other => Err(format!(
                "unknown mission {:?}; expected kepler, tess or custom",
                other
            )),
        }
    }
}

/// One point of the raw-versus-processed chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time: f64,
    pub flux: f64,
    pub processed_flux: f64,
}

/// Evenly strided chart series of at most `max_points` points.
pub fn chart_preview(raw: &LightCurve, curve: &NormalizedCurve, max_points: usize) -> Vec<ChartPoint> {
    if max_points == 0 {
        return Vec::new();
    }
    let stride = raw.len().div_ceil(max_points).max(1);
    raw.samples()
        .iter()
        .zip(curve.samples())
        .step_by(stride)
        .map(|(r, n)| ChartPoint {
            time: r.time,
            flux: r.flux,
            processed_flux: n.flux,
        })
        .collect()
}

/// Everything known about one analyzed light curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub source_id: String,
    /// SHA-256 of the uploaded text.
    pub checksum: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<Mission>,
    pub sample_count: usize,
    pub normalize_window: usize,
    pub summary: DetectionSummary,
    pub properties: Option<PlanetProperties>,
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<ChartPoint>>,
}

impl DetectionReport {
    pub fn new(run: &PipelineRun, checksum: impl Into<String>, stellar_radius_solar: f64) -> Self {
        Self {
            source_id: run.raw.source_id().to_string(),
            checksum: checksum.into(),
            generated_at: Utc::now(),
            mission: None,
            sample_count: run.raw.len(),
            normalize_window: run.curve.window(),
            summary: run.summary.clone(),
            properties: PlanetProperties::estimate(&run.summary, stellar_radius_solar),
            classification: None,
            preview: None,
        }
    }

    pub fn with_mission(mut self, mission: Option<Mission>) -> Self {
        self.mission = mission;
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn with_preview(mut self, run: &PipelineRun, max_points: usize) -> Self {
        self.preview = Some(chart_preview(&run.raw, &run.curve, max_points));
        self
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::calculate_checksum;
    use crate::services::pipeline::{DetectionPipeline, NoopObserver};
    use crate::services::synthetic::{generate, to_csv, SyntheticCurveSpec};

    fn sample_run() -> (String, PipelineRun) {
        let csv = to_csv(&generate(&SyntheticCurveSpec::default())).unwrap();
        let run = DetectionPipeline::default()
            .run_with_observer(&csv, &NoopObserver)
            .unwrap();
        (csv, run)
    }

    #[test]
    fn test_preview_is_decimated() {
        let (_, run) = sample_run();
        let preview = chart_preview(&run.raw, &run.curve, 100);

        assert_eq!(preview.len(), 100);
        assert_eq!(preview[1].time, run.raw.samples()[5].time);
        assert!(chart_preview(&run.raw, &run.curve, 0).is_empty());
        assert_eq!(chart_preview(&run.raw, &run.curve, 10_000).len(), 500);
    }

    #[test]
    fn test_report_json() {
        let (csv, run) = sample_run();
        let report = DetectionReport::new(&run, calculate_checksum(&csv), 1.0)
            .with_classification(Classification::new(87.0, "Confirmed Exoplanet").unwrap());

        let value: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["sampleCount"], 500);
        assert_eq!(value["checksum"].as_str().unwrap().len(), 64);
        assert!(value["summary"]["candidateCount"].as_u64().unwrap() >= 1);
        assert_eq!(value["classification"]["confidence"], 87.0);
        assert!(value.get("preview").is_none());
        assert!(value.get("mission").is_none());
    }

    #[test]
    fn test_mission_in_report() {
        let (csv, run) = sample_run();
        let report =
            DetectionReport::new(&run, calculate_checksum(&csv), 1.0).with_mission(Some(Mission::Kepler));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["mission"], "kepler");
    }

    #[test]
    fn test_mission_from_str() {
        assert_eq!("TESS".parse::<Mission>(), Ok(Mission::Tess));
        assert_eq!(" kepler ".parse::<Mission>(), Ok(Mission::Kepler));
        assert_eq!(Mission::Custom.to_string(), "custom");
        assert!("hubble".parse::<Mission>().is_err());
    }
}
