//! Error types for the detection pipeline.
//!
//! Every stage returns its own error type so callers can tell a malformed
//! file apart from a physically implausible light curve. [`PipelineError`]
//! wraps them transparently: its `Display` is the stage error itself.

use serde::Serialize;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised by the record parser.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The input does not contain a header plus at least two data rows
    /// (or fewer than two rows survived parsing).
    #[error("insufficient data: expected a header and at least 2 data rows, found {data_rows}")]
    InsufficientData { data_rows: usize },

    /// More than 20% of the data rows could not be converted.
    #[error("too many malformed rows: {skipped} of {total} rows skipped (first bad row on line {first_bad_line})")]
    TooManyMalformedRows {
        skipped: usize,
        total: usize,
        /// 1-based line number in the original text.
        first_bad_line: usize,
    },
}

/// Errors raised by the validator. Indices refer to the time-sorted sequence,
/// except for [`ValidationError::NonFiniteValue`] which is checked before
/// sorting and indexes the input order.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("non-finite {field} at sample {index}")]
    NonFiniteValue { index: usize, field: &'static str },

    #[error("non-monotonic time at sample {index}: t={time} repeats the previous timestamp")]
    NonMonotonicTime { index: usize, time: f64 },

    #[error("flux out of range at sample {index}: {flux} (median {median})")]
    FluxOutOfRange { index: usize, flux: f64, median: f64 },
}

/// Top-level pipeline error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Caller supplied options that cannot be honored.
    #[error("invalid pipeline options: {0}")]
    InvalidOptions(String),
}

/// Where in the input a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ErrorLocation {
    /// 1-based line number in the raw text.
    Line(usize),
    /// 0-based sample index.
    Sample(usize),
}

impl PipelineError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Parse(_) => "parse",
            PipelineError::Validation(_) => "validate",
            PipelineError::InvalidOptions(_) => "options",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Parse(ParseError::InsufficientData { .. }) => "INSUFFICIENT_DATA",
            PipelineError::Parse(ParseError::TooManyMalformedRows { .. }) => {
                "TOO_MANY_MALFORMED_ROWS"
            }
            PipelineError::Validation(ValidationError::NonFiniteValue { .. }) => {
                "NON_FINITE_VALUE"
            }
            PipelineError::Validation(ValidationError::NonMonotonicTime { .. }) => {
                "NON_MONOTONIC_TIME"
            }
            PipelineError::Validation(ValidationError::FluxOutOfRange { .. }) => {
                "FLUX_OUT_OF_RANGE"
            }
            PipelineError::InvalidOptions(_) => "INVALID_OPTIONS",
        }
    }

    /// Row or sample index of the offending record, when known.
    pub fn location(&self) -> Option<ErrorLocation> {
        match self {
            PipelineError::Parse(ParseError::TooManyMalformedRows { first_bad_line, .. }) => {
                Some(ErrorLocation::Line(*first_bad_line))
            }
            PipelineError::Validation(ValidationError::NonFiniteValue { index, .. })
            | PipelineError::Validation(ValidationError::NonMonotonicTime { index, .. })
            | PipelineError::Validation(ValidationError::FluxOutOfRange { index, .. }) => {
                Some(ErrorLocation::Sample(*index))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_stage_error() {
        let inner = ValidationError::NonMonotonicTime { index: 4, time: 1.5 };
        let err: PipelineError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.stage(), "validate");
    }

    #[test]
    fn test_location_reporting() {
        let err = PipelineError::from(ParseError::TooManyMalformedRows {
            skipped: 3,
            total: 5,
            first_bad_line: 2,
        });
        assert_eq!(err.location(), Some(ErrorLocation::Line(2)));
        assert_eq!(err.code(), "TOO_MANY_MALFORMED_ROWS");

        let err = PipelineError::from(ValidationError::FluxOutOfRange {
            index: 7,
            flux: -1.0,
            median: 1.0,
        });
        assert_eq!(err.location(), Some(ErrorLocation::Sample(7)));

        let err = PipelineError::from(ValidationError::NonFiniteValue {
            index: 3,
            field: "flux",
        });
        assert_eq!(err.location(), Some(ErrorLocation::Sample(3)));
        assert_eq!(err.code(), "NON_FINITE_VALUE");
        assert_eq!(err.to_string(), "non-finite flux at sample 3");

        let err = PipelineError::from(ParseError::InsufficientData { data_rows: 1 });
        assert_eq!(err.location(), None);
    }
}
