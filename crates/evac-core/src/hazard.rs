//! Hazard classification and severity scoring.

use crate::models::{clamp_safety_level, HazardCategory};

/// Map a weather alert event name (e.g. "Flash Flood Warning") to a category.
pub fn classify_weather_event(event: &str) -> HazardCategory {
    let event = event.to_ascii_lowercase();
    if event.contains("tsunami") {
        HazardCategory::Tsunami
    } else if event.contains("hurricane") || event.contains("tropical storm") || event.contains("typhoon") {
        HazardCategory::Hurricane
    } else if event.contains("flood") || event.contains("storm surge") {
        HazardCategory::Flood
    } else if event.contains("fire") || event.contains("red flag") || event.contains("smoke") {
        HazardCategory::Fire
    } else if event.contains("hazardous materials")
        || event.contains("chemical")
        || event.contains("nuclear")
        || event.contains("radiological")
    {
        HazardCategory::Chemical
    } else if event.contains("earthquake") {
        HazardCategory::Earthquake
    } else {
        HazardCategory::General
    }
}

/// Map a FEMA incident type (e.g. "Severe Storm", "Fire") to a category.
pub fn classify_incident_type(incident_type: &str) -> HazardCategory {
    match incident_type.trim().to_ascii_lowercase().as_str() {
        "fire" | "wildfire" => HazardCategory::Fire,
        "flood" | "dam/levee break" | "coastal storm" => HazardCategory::Flood,
        "earthquake" => HazardCategory::Earthquake,
        "hurricane" | "typhoon" | "tropical storm" => HazardCategory::Hurricane,
        "tsunami" => HazardCategory::Tsunami,
        "chemical" | "toxic substances" | "terrorist" => HazardCategory::Chemical,
        _ => HazardCategory::General,
    }
}

/// Safety level for routes leaving a seismic event: `max(1, min(5, 6 - magnitude))`.
///
/// `6 - magnitude` is rounded to the nearest integer (halves away from zero)
/// before clamping, so M4.6 gives 1 and M4.4 gives 2.
pub fn magnitude_safety_level(magnitude: f64) -> u8 {
    if !magnitude.is_finite() {
        return 3;
    }
    clamp_safety_level((6.0 - magnitude).round() as i64)
}

/// Safety level implied by a CAP severity string.
pub fn severity_safety_level(severity: &str) -> u8 {
    match severity.trim().to_ascii_lowercase().as_str() {
        "extreme" => 1,
        "severe" => 2,
        "moderate" => 3,
        "minor" => 4,
        _ => 3,
    }
}

/// Distance a hazard-avoidance route should reach for a given magnitude.
///
/// Two kilometers per magnitude unit, kept within `[min_m, max_m]`.
pub fn magnitude_reach_m(magnitude: f64, min_m: f64, max_m: f64) -> f64 {
    if !magnitude.is_finite() {
        return min_m;
    }
    (magnitude * 2_000.0).clamp(min_m, max_m)
}
