//! Core data models for evacuation aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spatial::{bearing_description, haversine_distance, CompassDirection};

/// A WGS84 position. Always `(lat, lon)` internally, regardless of wire order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("coordinate is not finite ({lat}, {lon})")]
    NonFinite { lat: f64, lon: f64 },
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a GeoJSON position (`[lon, lat, ...]`).
    ///
    /// Extra members such as depth or altitude are ignored. Returns `None`
    /// when fewer than two members are present or either axis is non-finite.
    pub fn from_geojson(position: &[f64]) -> Option<Self> {
        let (&lon, &lat) = (position.first()?, position.get(1)?);
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        Some(Self { lat, lon })
    }

    /// GeoJSON order, `[lon, lat]`.
    pub fn to_geojson(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(CoordinateError::NonFinite {
                lat: self.lat,
                lon: self.lon,
            });
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(CoordinateError::LongitudeOutOfRange(self.lon));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Hazard class an evacuation route responds to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardCategory {
    Fire,
    Flood,
    Earthquake,
    Hurricane,
    Tsunami,
    Chemical,
    #[default]
    General,
}

impl HazardCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Flood => "flood",
            Self::Earthquake => "earthquake",
            Self::Hurricane => "hurricane",
            Self::Tsunami => "tsunami",
            Self::Chemical => "chemical",
            Self::General => "general",
        }
    }
}

/// Where a route came from. Deduplication inserts `Official` routes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteProvenance {
    /// Road-network or directions data from an authoritative provider.
    Official,
    /// Projected from a live hazard signal.
    Derived,
    /// Generated without any provider input.
    #[default]
    Synthetic,
}

pub const MIN_SAFETY_LEVEL: u8 = 1;
pub const MAX_SAFETY_LEVEL: u8 = 5;

/// Clamp an arbitrary score into the 1..=5 safety scale.
pub fn clamp_safety_level(level: i64) -> u8 {
    level.clamp(MIN_SAFETY_LEVEL as i64, MAX_SAFETY_LEVEL as i64) as u8
}

/// A candidate path away from danger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvacuationRoute {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Ordered path, origin-adjacent first. At least two points.
    pub waypoints: Vec<Coordinate>,
    pub hazard: HazardCategory,
    pub estimated_travel_secs: u32,
    pub updated_at: DateTime<Utc>,
    /// 1 (least safe) ..= 5 (safest)
    pub safety_level: u8,
    pub authority: String,
    pub source: String,
    #[serde(default)]
    pub provenance: RouteProvenance,
}

impl EvacuationRoute {
    pub fn start(&self) -> Option<Coordinate> {
        self.waypoints.first().copied()
    }

    pub fn end(&self) -> Option<Coordinate> {
        self.waypoints.last().copied()
    }

    /// Compass heading from the first to the last waypoint.
    pub fn heading(&self) -> Option<CompassDirection> {
        Some(bearing_description(self.start()?, self.end()?))
    }

    /// Sum of great-circle segment lengths in meters.
    pub fn length_m(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| haversine_distance(pair[0], pair[1]))
            .sum()
    }

    pub fn is_consistent(&self) -> bool {
        self.waypoints.len() >= 2
            && self.waypoints.iter().all(Coordinate::is_valid)
            && (MIN_SAFETY_LEVEL..=MAX_SAFETY_LEVEL).contains(&self.safety_level)
            && self.estimated_travel_secs > 0
    }
}

/// A shelter-class facility with capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub id: String,
    pub name: String,
    pub description: String,
    pub center: Coordinate,
    pub radius_m: f64,
    pub capacity: u32,
    /// May exceed `capacity`; over-capacity is meaningful.
    pub occupancy: u32,
    pub resources: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub safety_level: u8,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    pub source: String,
}

impl SafeZone {
    /// Occupancy as a fraction of capacity. A zero-capacity zone reads as full.
    pub fn occupancy_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.occupancy as f64 / self.capacity as f64
    }

    pub fn is_over_capacity(&self) -> bool {
        self.occupancy > self.capacity
    }

    pub fn available_spaces(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    pub fn is_consistent(&self) -> bool {
        self.center.is_valid()
            && self.radius_m.is_finite()
            && self.radius_m > 0.0
            && self.capacity > 0
            && (MIN_SAFETY_LEVEL..=MAX_SAFETY_LEVEL).contains(&self.safety_level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    pub magnitude: f64,
    pub epicenter: Coordinate,
    pub time: DateTime<Utc>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: String,
    pub event: String,
    pub headline: String,
    pub severity: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterDeclaration {
    pub id: String,
    pub title: String,
    pub incident_type: String,
}

/// A live hazard used to steer the cascade and seed route synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HazardSignal {
    Seismic(SeismicEvent),
    Weather(WeatherAlert),
    Disaster(DisasterDeclaration),
}

impl HazardSignal {
    pub fn category(&self) -> HazardCategory {
        match self {
            Self::Seismic(_) => HazardCategory::Earthquake,
            Self::Weather(alert) => crate::hazard::classify_weather_event(&alert.event),
            Self::Disaster(decl) => crate::hazard::classify_incident_type(&decl.incident_type),
        }
    }

    /// Point location, when the feed provides one.
    pub fn location(&self) -> Option<Coordinate> {
        match self {
            Self::Seismic(event) => Some(event.epicenter),
            Self::Weather(_) | Self::Disaster(_) => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Seismic(event) => &event.title,
            Self::Weather(alert) => &alert.headline,
            Self::Disaster(decl) => &decl.title,
        }
    }
}

/// Raw item returned by a provider before merge and deduplication.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Hazard(HazardSignal),
    Route(EvacuationRoute),
    Zone(SafeZone),
}

impl Feature {
    pub fn into_hazard(self) -> Option<HazardSignal> {
        match self {
            Self::Hazard(signal) => Some(signal),
            _ => None,
        }
    }

    pub fn into_route(self) -> Option<EvacuationRoute> {
        match self {
            Self::Route(route) => Some(route),
            _ => None,
        }
    }

    pub fn into_zone(self) -> Option<SafeZone> {
        match self {
            Self::Zone(zone) => Some(zone),
            _ => None,
        }
    }
}
