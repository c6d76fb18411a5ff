//! Server configuration from environment.

use evac_core::AggregationPolicy;
use evac_providers::settings::{
    ProviderSettings, DEFAULT_DIRECTIONS_URL, DEFAULT_DISASTER_URL, DEFAULT_OVERPASS_URL,
    DEFAULT_PLACES_URL, DEFAULT_SEISMIC_URL, DEFAULT_WEATHER_URL,
};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Search radius when a request does not carry one
    pub default_radius_m: f64,
    pub log_json: bool,
    pub providers: ProviderSettings,
    pub policy: AggregationPolicy,
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let timeout_s: u64 = parsed("EVAC_PROVIDER_TIMEOUT_S").unwrap_or(10).max(1);
        let policy = AggregationPolicy {
            provider_timeout_secs: timeout_s,
            ..AggregationPolicy::default()
        };

        let providers = ProviderSettings {
            seismic_url: non_empty("EVAC_SEISMIC_URL").unwrap_or_else(|| DEFAULT_SEISMIC_URL.to_string()),
            seismic_min_magnitude: parsed("EVAC_SEISMIC_MIN_MAGNITUDE").unwrap_or(2.5),
            weather_url: non_empty("EVAC_WEATHER_URL").unwrap_or_else(|| DEFAULT_WEATHER_URL.to_string()),
            disaster_url: non_empty("EVAC_DISASTER_URL").unwrap_or_else(|| DEFAULT_DISASTER_URL.to_string()),
            disaster_state: non_empty("EVAC_DISASTER_STATE"),
            disaster_lookback_days: parsed("EVAC_DISASTER_LOOKBACK_DAYS").unwrap_or(30),
            places_url: non_empty("EVAC_PLACES_URL").unwrap_or_else(|| DEFAULT_PLACES_URL.to_string()),
            directions_url: non_empty("EVAC_DIRECTIONS_URL")
                .unwrap_or_else(|| DEFAULT_DIRECTIONS_URL.to_string()),
            maps_api_key: non_empty("EVAC_MAPS_API_KEY"),
            overpass_url: non_empty("EVAC_OVERPASS_URL").unwrap_or_else(|| DEFAULT_OVERPASS_URL.to_string()),
            user_agent: non_empty("EVAC_USER_AGENT")
                .unwrap_or_else(|| concat!("evac-server/", env!("CARGO_PKG_VERSION")).to_string()),
            timeout: Duration::from_secs(timeout_s),
            ..ProviderSettings::default()
        };

        Self {
            server_port: parsed("EVAC_PORT").unwrap_or(3000),
            default_radius_m: parsed::<f64>("EVAC_DEFAULT_RADIUS_M")
                .filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(10_000.0),
            log_json: env::var("EVAC_LOG_JSON")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
            providers,
            policy,
        }
    }
}
