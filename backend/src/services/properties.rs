//! Physical properties derived from a detection summary.

use serde::{Deserialize, Serialize};

use crate::models::DetectionSummary;

/// Earth radii per solar radius.
pub const EARTH_RADII_PER_SOLAR_RADIUS: f64 = 109.2;

/// Stellar radius assumed when the caller has none, in solar radii.
pub const DEFAULT_STELLAR_RADIUS: f64 = 1.0;

/// First-order planet properties. The radius follows from
/// `depth ≈ (R_planet / R_star)²`, ignoring limb darkening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetProperties {
    pub orbital_period_days: Option<f64>,
    pub transit_depth: f64,
    pub transit_duration_hours: f64,
    pub radius_ratio: f64,
    pub stellar_radius_solar: f64,
    pub planet_radius_earth: f64,
}

impl PlanetProperties {
    /// Estimate properties, or `None` when nothing was detected.
    pub fn estimate(summary: &DetectionSummary, stellar_radius_solar: f64) -> Option<Self> {
        if !summary.has_candidates() || summary.transit_depth <= 0.0 {
            return None;
        }

        let radius_ratio = summary.transit_depth.sqrt();
        Some(Self {
            orbital_period_days: summary.orbital_period_estimate,
            transit_depth: summary.transit_depth,
            transit_duration_hours: summary.transit_duration * 24.0,
            radius_ratio,
            stellar_radius_solar,
            planet_radius_earth: radius_ratio * stellar_radius_solar * EARTH_RADII_PER_SOLAR_RADIUS,
        })
    }
}
