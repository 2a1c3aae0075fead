//! Record parser for `time,flux[,flux_error]` light-curve text.
//!
//! Records are read with the `csv` crate and classified one at a time into a
//! [`RowOutcome`]; nothing is coerced implicitly. Malformed rows are skipped
//! and counted, and the whole file is rejected once they exceed
//! [`MAX_MALFORMED_RATIO`].

use csv::{Position, ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};

use crate::error::ParseError;
use crate::models::{LightCurve, Sample};
use crate::parsing::checksum::source_id_for;

/// Flux error used when a row has no third column ("unknown precision").
pub const DEFAULT_FLUX_ERROR: f64 = 0.0001;

/// Largest tolerated fraction of skipped data rows.
pub const MAX_MALFORMED_RATIO: f64 = 0.20;

/// Why a data row was not turned into a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Row had a field count other than 2 or 3.
    FieldCount(usize),
    /// Field at this 0-based column is empty or not a number.
    NotNumeric { column: usize },
    /// Field parsed to NaN or infinity.
    NonFinite { column: usize },
    /// Flux error below zero.
    NegativeError,
    /// The CSV reader could not decode the record.
    Unreadable(String),
}

/// Outcome of classifying one data row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Sample(Sample),
    Skip(SkipReason),
}

/// Parse raw text into a [`LightCurve`] with a content-derived source id.
pub fn parse(raw_text: &str) -> Result<LightCurve, ParseError> {
    parse_with_source(raw_text, source_id_for(raw_text))
}

/// Parse raw text into a [`LightCurve`] labelled with `source_id`.
///
/// The first non-blank record is a header and is ignored. At least two data
/// rows are required.
pub fn parse_with_source(
    raw_text: &str,
    source_id: impl Into<String>,
) -> Result<LightCurve, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw_text.as_bytes());

    let mut records = reader
        .records()
        .filter(|record| !matches!(record, Ok(r) if is_blank(r)));

    let header = records.next();
    let rows: Vec<csv::Result<StringRecord>> = records.collect();

    if header.is_none() || rows.len() < 2 {
        return Err(ParseError::InsufficientData {
            data_rows: rows.len(),
        });
    }

    let mut samples = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    let mut first_bad_line = None;

    for row in &rows {
        let (line_no, outcome) = match row {
            Ok(record) => (line_of(record.position()), classify_record(record)),
            Err(e) => (
                line_of(e.position()),
                RowOutcome::Skip(SkipReason::Unreadable(e.to_string())),
            ),
        };
        match outcome {
            RowOutcome::Sample(sample) => samples.push(sample),
            RowOutcome::Skip(reason) => {
                skipped += 1;
                first_bad_line.get_or_insert(line_no);
                debug!("Skipping line {}: {:?}", line_no, reason);
            }
        }
    }

    let total = rows.len();
    if skipped as f64 / total as f64 > MAX_MALFORMED_RATIO {
        return Err(ParseError::TooManyMalformedRows {
            skipped,
            total,
            first_bad_line: first_bad_line.unwrap_or(0),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} of {} malformed rows", skipped, total);
    }

    LightCurve::new(source_id, samples)
}

/// Classify a single data record.
pub fn classify_record(record: &StringRecord) -> RowOutcome {
    if record.len() != 2 && record.len() != 3 {
        return RowOutcome::Skip(SkipReason::FieldCount(record.len()));
    }

    let mut values = [0.0f64; 3];
    for (column, field) in record.iter().enumerate() {
        let value = match field.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => return RowOutcome::Skip(SkipReason::NotNumeric { column }),
        };
        if !value.is_finite() {
            return RowOutcome::Skip(SkipReason::NonFinite { column });
        }
        values[column] = value;
    }

    let flux_error = if record.len() == 3 {
        values[2]
    } else {
        DEFAULT_FLUX_ERROR
    };
    if flux_error < 0.0 {
        return RowOutcome::Skip(SkipReason::NegativeError);
    }

    RowOutcome::Sample(Sample::new(values[0], values[1], flux_error))
}

/// A whitespace-only line reads as one empty field.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0) == Some("")
}

/// 1-based line of a record, 0 when the reader did not report one.
fn line_of(position: Option<&Position>) -> usize {
    position.map_or(0, |p| p.line() as usize)
}
