//! Preprocessing stages that sit between parsing and detection.
//!
//! - [`validator`]: Sort by time and reject physically implausible curves
//! - [`normalizer`]: Detrend and rescale flux to a unit baseline

pub mod normalizer;
pub mod validator;

pub use normalizer::{coerce_window, default_window, normalize, widest_window, MIN_WINDOW};
pub use validator::{validate, MAX_FLUX_TO_MEDIAN};
