//! Orbital period estimation from candidate start times.
//!
//! Consecutive start-time gaps are compared against trial periods `g / k`
//! (`k = 1..=4`) so that a missed transit, which doubles or triples a gap,
//! still lines up with the true period. A trial is scored by the longest
//! stretch of consecutive gaps that are near-integer multiples of it.

use log::debug;

/// Harmonics tried for each gap.
pub const MAX_HARMONIC: u32 = 4;

/// Largest allowed distance of `gap / period` from an integer.
pub const PERIOD_TOLERANCE: f64 = 0.05;

/// Fewest consecutive consistent gaps needed for an estimate.
pub const MIN_CONSISTENT_GAPS: usize = 2;

#[derive(Debug, Clone, Copy)]
struct Fit {
    period: f64,
    start: usize,
    len: usize,
}

/// Estimate the orbital period in days from ordered candidate start times.
///
/// Returns `None` for fewer than three starts or when no trial period fits
/// at least two consecutive gaps.
///
/// # Examples
///
/// ```
/// use exo_transit::algorithms::estimate_period;
///
/// // the transit near day 7.5 was missed
/// let period = estimate_period(&[1.5, 4.5, 10.5]).unwrap();
/// assert!((period - 3.0).abs() < 1e-9);
///
/// assert_eq!(estimate_period(&[3.0, 4.1]), None);
/// ```
pub fn estimate_period(start_times: &[f64]) -> Option<f64> {
    let gaps: Vec<f64> = start_times.windows(2).map(|w| w[1] - w[0]).collect();
    if gaps.len() < MIN_CONSISTENT_GAPS || gaps.iter().any(|g| *g <= 0.0) {
        return None;
    }

    let mut best: Option<Fit> = None;
    for &gap in &gaps {
        for k in 1..=MAX_HARMONIC {
            let period = gap / f64::from(k);
            let (start, len) = longest_fitting_run(&gaps, period);
            let better = match best {
                None => true,
                Some(b) => len > b.len || (len == b.len && period > b.period),
            };
            if better {
                best = Some(Fit { period, start, len });
            }
        }
    }

    let fit = best.filter(|f| f.len >= MIN_CONSISTENT_GAPS)?;
    let run = &gaps[fit.start..fit.start + fit.len];
    let total_gap: f64 = run.iter().sum();
    let total_cycles: f64 = run.iter().map(|g| (g / fit.period).round()).sum();
    let refined = total_gap / total_cycles;

    debug!(
        "Period estimate {:.5} d from {} of {} gaps (trial {:.5} d)",
        refined,
        fit.len,
        gaps.len(),
        fit.period
    );

    Some(refined)
}

fn fits(gap: f64, period: f64) -> bool {
    let ratio = gap / period;
    let cycles = ratio.round();
    cycles >= 1.0 && (ratio - cycles).abs() <= PERIOD_TOLERANCE
}

/// `(start, len)` of the longest run of consecutive gaps fitting `period`.
fn longest_fitting_run(gaps: &[f64], period: f64) -> (usize, usize) {
    let mut best = (0, 0);
    let mut current_start = 0;
    let mut current_len = 0;
    for (i, &gap) in gaps.iter().enumerate() {
        if fits(gap, period) {
            if current_len == 0 {
                current_start = i;
            }
            current_len += 1;
            if current_len > best.1 {
                best = (current_start, current_len);
            }
        } else {
            current_len = 0;
        }
    }
    best
}
