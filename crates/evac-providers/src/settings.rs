//! Endpoints and per-feed parameters.

use std::time::Duration;

pub const DEFAULT_SEISMIC_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
pub const DEFAULT_WEATHER_URL: &str = "https://api.weather.gov/alerts/active";
pub const DEFAULT_DISASTER_URL: &str =
    "https://www.fema.gov/api/open/v2/DisasterDeclarationsSummaries";
pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub seismic_url: String,
    pub seismic_min_magnitude: f64,
    pub seismic_lookback_hours: i64,
    pub weather_url: String,
    pub disaster_url: String,
    /// Two-letter state code; declarations are not queried without one.
    pub disaster_state: Option<String>,
    pub disaster_lookback_days: i64,
    pub places_url: String,
    pub directions_url: String,
    /// Shared key for places and directions; both are skipped without one.
    pub maps_api_key: Option<String>,
    pub overpass_url: String,
    /// Largest half-span of an Overpass bounding box, in degrees.
    pub overpass_max_span_deg: f64,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            seismic_url: DEFAULT_SEISMIC_URL.to_string(),
            seismic_min_magnitude: 2.5,
            seismic_lookback_hours: 24,
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            disaster_url: DEFAULT_DISASTER_URL.to_string(),
            disaster_state: None,
            disaster_lookback_days: 30,
            places_url: DEFAULT_PLACES_URL.to_string(),
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            maps_api_key: None,
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            overpass_max_span_deg: 0.25,
            user_agent: concat!("evac-engine/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}
