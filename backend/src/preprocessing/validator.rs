//! Light-curve validation.
//!
//! Sorts the samples by time and rejects inputs that cannot be physical:
//! non-finite values, repeated timestamps and flux readings that are
//! negative or far above the median. Transits only ever decrease flux, so a reading ten times the
//! median is a corrupt sensor value, not a signal.

use log::debug;

use crate::algorithms::stats;
use crate::error::ValidationError;
use crate::models::LightCurve;

/// Flux above this multiple of the median is out of range.
pub const MAX_FLUX_TO_MEDIAN: f64 = 10.0;

/// Validate a light curve, returning it sorted by time.
///
/// # Errors
///
/// * [`ValidationError::NonFiniteValue`] for a NaN or infinite time, flux or
///   flux error. This is checked first and its index is the input position.
/// * [`ValidationError::NonMonotonicTime`] when two samples share a timestamp
///   (duplicates are corrupt input and are never dropped silently).
/// * [`ValidationError::FluxOutOfRange`] for negative flux or flux above
///   [`MAX_FLUX_TO_MEDIAN`] × median.
///
/// Other reported indices refer to the time-sorted sequence.
///
/// # Examples
///
/// ```
/// use exo_transit::parsing::parse;
/// use exo_transit::preprocessing::validate;
///
/// let curve = parse("time,flux\n0.04,1.0\n0.0,1.0\n0.02,0.99\n").unwrap();
/// let curve = validate(curve).unwrap();
/// assert_eq!(curve.samples()[0].time, 0.0);
/// ```
pub fn validate(curve: LightCurve) -> Result<LightCurve, ValidationError> {
    check_finite(&curve)?;

    let curve = curve.sorted_by_time();
    let samples = curve.samples();

    if let Some(i) = samples.windows(2).position(|w| w[1].time <= w[0].time) {
        return Err(ValidationError::NonMonotonicTime {
            index: i + 1,
            time: samples[i + 1].time,
        });
    }

    let median = stats::median(&curve.fluxes()).unwrap_or(0.0);
    let ceiling = MAX_FLUX_TO_MEDIAN * median;
    if let Some((index, sample)) = samples
        .iter()
        .enumerate()
        .find(|(_, s)| s.flux < 0.0 || s.flux > ceiling)
    {
        return Err(ValidationError::FluxOutOfRange {
            index,
            flux: sample.flux,
            median,
        });
    }

    debug!(
        "Validated {} samples for {} ({} discontinuities)",
        curve.len(),
        curve.source_id(),
        curve.discontinuities().len()
    );

    Ok(curve)
}

fn check_finite(curve: &LightCurve) -> Result<(), ValidationError> {
    for (index, sample) in curve.samples().iter().enumerate() {
        let field = if !sample.time.is_finite() {
            "time"
        } else if !sample.flux.is_finite() {
            "flux"
        } else if !sample.flux_error.is_finite() {
            "flux error"
        } else {
            continue;
        };
        return Err(ValidationError::NonFiniteValue { index, field });
    }
    Ok(())
}
