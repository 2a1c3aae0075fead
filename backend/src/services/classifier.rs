//! Boundary with the external transit classifier.
//!
//! The model itself lives outside this crate. The pipeline assembles a
//! [`ClassifierInput`] and an implementation of [`TransitClassifier`] turns
//! it into a [`Classification`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{DetectionSummary, NormalizedCurve, TransitCandidate};

/// Errors returned across the classifier boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("confidence must be within [0, 100], got {0}")]
    InvalidConfidence(f64),

    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// Features sent to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierInput {
    pub candidates: Vec<TransitCandidate>,
    pub orbital_period_estimate: Option<f64>,
    pub normalized_flux_series: Vec<f64>,
}

impl ClassifierInput {
    pub fn new(summary: &DetectionSummary, curve: &NormalizedCurve) -> Self {
        Self {
            candidates: summary.candidates.clone(),
            orbital_period_estimate: summary.orbital_period_estimate,
            normalized_flux_series: curve.flux_series(),
        }
    }
}

/// Confidence bands used when presenting a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 80.0 {
            ConfidenceTier::High
        } else if confidence >= 60.0 {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfidenceTier::High => {
                "High confidence detection - strong candidate for follow-up observation"
            }
            ConfidenceTier::Moderate => "Moderate confidence - additional analysis recommended",
            ConfidenceTier::Low => "Low confidence - likely false positive or insufficient data",
        }
    }
}

/// Classifier verdict. `confidence` is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub confidence: f64,
    pub label: String,
}

impl Classification {
    pub fn new(confidence: f64, label: impl Into<String>) -> Result<Self, ClassifierError> {
        if !(0.0..=100.0).contains(&confidence) {
            return Err(ClassifierError::InvalidConfidence(confidence));
        }
        Ok(Self {
            confidence,
            label: label.into(),
        })
    }

    /// Default label for a confidence: confirmed at 80% and above.
    pub fn label_for(confidence: f64) -> &'static str {
        if confidence >= 80.0 {
            "Confirmed Exoplanet"
        } else {
            "Exoplanet Candidate"
        }
    }

    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }
}

/// External model seam.
#[async_trait]
pub trait TransitClassifier: Send + Sync {
    async fn classify(&self, input: &ClassifierInput) -> Result<Classification, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier(f64);

    #[async_trait]
    impl TransitClassifier for FixedClassifier {
        async fn classify(
            &self,
            input: &ClassifierInput,
        ) -> Result<Classification, ClassifierError> {
            if input.candidates.is_empty() {
                return Classification::new(0.0, "No Transit");
            }
            Classification::new(self.0, Classification::label_for(self.0))
        }
    }

    fn input_with(candidates: usize) -> ClassifierInput {
        ClassifierInput {
            candidates: (0..candidates)
                .map(|i| TransitCandidate {
                    start_time: i as f64 * 3.0,
                    end_time: i as f64 * 3.0 + 0.2,
                    depth: 0.015,
                    significance: 150.0,
                })
                .collect(),
            orbital_period_estimate: None,
            normalized_flux_series: vec![1.0; 10],
        }
    }

    #[test]
    fn test_confidence_bounds() {
        assert!(Classification::new(0.0, "x").is_ok());
        assert!(Classification::new(100.0, "x").is_ok());
        assert_eq!(
            Classification::new(100.5, "x"),
            Err(ClassifierError::InvalidConfidence(100.5))
        );
        assert!(Classification::new(-1.0, "x").is_err());
        assert!(Classification::new(f64::NAN, "x").is_err());
    }

    #[test]
    fn test_tiers() {
        assert_eq!(ConfidenceTier::from_confidence(80.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(79.9), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_confidence(60.0), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_confidence(12.0), ConfidenceTier::Low);
    }

    #[tokio::test]
    async fn test_classifier_seam() {
        let classifier = FixedClassifier(91.0);

        let verdict = classifier.classify(&input_with(3)).await.unwrap();
        assert_eq!(verdict.label, "Confirmed Exoplanet");
        assert_eq!(verdict.tier(), ConfidenceTier::High);

        let verdict = classifier.classify(&input_with(0)).await.unwrap();
        assert_eq!(verdict.tier(), ConfidenceTier::Low);
    }

    #[test]
    fn test_input_serializes_camel_case() {
        let value = serde_json::to_value(input_with(1)).unwrap();
        assert!(value.get("normalizedFluxSeries").is_some());
        assert!(value["orbitalPeriodEstimate"].is_null());
    }
}
