//! Parsers for uploaded light-curve data.
//!
//! # Parsers
//!
//! - [`csv_parser`]: Parse `time,flux[,flux_error]` text into a [`LightCurve`]
//! - [`checksum`]: Content checksums and derived source identifiers
//!
//! # Example
//!
//! ```
//! use exo_transit::parsing::parse;
//!
//! let curve = parse("time,flux\n0.0,1.0\n0.02,0.998\n").expect("valid light curve");
//! assert_eq!(curve.len(), 2);
//! ```
//!
//! [`LightCurve`]: crate::models::LightCurve

pub mod checksum;
pub mod csv_parser;


pub use checksum::{calculate_checksum, source_id_for};
pub use csv_parser::{classify_record, parse, parse_with_source, RowOutcome, SkipReason};
