//! Great-circle math for projection, bearings and proximity checks.

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean earth radius used by every spherical formula in this crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Rough meters per degree used for query bounding boxes.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Calculate distance between two points in meters using the Haversine formula.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Project a point along a bearing.
///
/// # Arguments
/// * `origin` - Starting position
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
/// * `distance_m` - Distance in meters
///
/// Longitude of the result is normalized to [-180, 180).
pub fn destination_point(origin: Coordinate, bearing_rad: f64, distance_m: f64) -> Coordinate {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let lon2 = (lon1 + y.atan2(x) + PI).rem_euclid(2.0 * PI) - PI;

    Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Initial great-circle bearing from `from` to `to`, in radians (0 = north, π/2 = east).
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lon - from.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// One of the eight compass sectors, each 45° wide and centered on its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 8] = [
        Self::North,
        Self::Northeast,
        Self::East,
        Self::Southeast,
        Self::South,
        Self::Southwest,
        Self::West,
        Self::Northwest,
    ];

    /// Bucket a heading in degrees. Any finite value is accepted.
    pub fn from_degrees(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        Self::ALL[sector]
    }

    /// Center heading of the sector in degrees.
    pub fn degrees(self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::Northeast => 45.0,
            Self::East => 90.0,
            Self::Southeast => 135.0,
            Self::South => 180.0,
            Self::Southwest => 225.0,
            Self::West => 270.0,
            Self::Northwest => 315.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::Northeast => "northeast",
            Self::East => "east",
            Self::Southeast => "southeast",
            Self::South => "south",
            Self::Southwest => "southwest",
            Self::West => "west",
            Self::Northwest => "northwest",
        }
    }
}

impl std::fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse compass direction from `from` to `to`.
///
/// Uses the planar `atan2(Δlon, Δlat)` heading, which is what the sector
/// buckets were tuned against; it is not the great-circle bearing.
pub fn bearing_description(from: Coordinate, to: Coordinate) -> CompassDirection {
    let dlat = to.lat - from.lat;
    let dlon = to.lon - from.lon;
    CompassDirection::from_degrees(dlon.atan2(dlat).to_degrees())
}

/// Axis-aligned query box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box around `center` reaching `radius_m` in each direction.
    ///
    /// The half-span is `radius_m / 111000` degrees, capped at `max_span_deg`.
    /// Longitude span is widened by `1 / cos(lat)` and capped the same way.
    pub fn around(center: Coordinate, radius_m: f64, max_span_deg: f64) -> Self {
        let lat_span = (radius_m.max(0.0) / METERS_PER_DEGREE).min(max_span_deg);
        let lon_scale = center.lat.to_radians().cos().abs().max(0.1);
        let lon_span = (lat_span / lon_scale).min(max_span_deg);
        Self {
            min_lat: (center.lat - lat_span).max(-90.0),
            min_lon: (center.lon - lon_span).max(-180.0),
            max_lat: (center.lat + lat_span).min(90.0),
            max_lon: (center.lon + lon_span).min(180.0),
        }
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    /// Overpass `(south,west,north,east)` ordering.
    pub fn to_overpass(&self) -> String {
        format!(
            "{:.6},{:.6},{:.6},{:.6}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}
