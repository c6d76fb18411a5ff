//! Route-discovery cascade as an explicit state machine.
//!
//! ```text
//! CheckHazards --signals--> HazardRoutes
//!      | none
//! CheckWeather --alerts---> WeatherRoutes
//!      | none
//! CheckTraffic --roads----> TrafficRoutes
//!      | none
//!    Empty ---------------> Synthetic
//! ```
//!
//! Each decision function looks only at what its tier returned, so the
//! transitions can be tested without any provider.

use evac_core::hazard::{classify_weather_event, severity_safety_level};
use evac_core::{EvacuationRoute, Feature, HazardCategory, HazardSignal, WeatherAlert};
use serde::{Deserialize, Serialize};

/// Non-terminal cascade states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    CheckHazards,
    CheckWeather,
    CheckTraffic,
    Empty,
}

/// Where a route discovery ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeOutcome {
    HazardRoutes,
    WeatherRoutes,
    TrafficRoutes,
    /// Every tier came back empty or failed.
    Synthetic,
    /// The caller reported no connectivity; no provider was consulted.
    Offline,
}

impl CascadeOutcome {
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Synthetic | Self::Offline)
    }
}

/// Result of a tier decision: stop with the tier's payload or move on.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<T> {
    Stop(T),
    Advance(CascadeState),
}

/// Hazard tier: any seismic event or declaration ends the cascade.
pub fn decide_hazards(features: Vec<Feature>) -> Decision<Vec<HazardSignal>> {
    let signals: Vec<HazardSignal> = features.into_iter().filter_map(Feature::into_hazard).collect();
    if signals.is_empty() {
        Decision::Advance(CascadeState::CheckWeather)
    } else {
        Decision::Stop(signals)
    }
}

/// Weather tier: any active alert ends the cascade.
pub fn decide_weather(features: Vec<Feature>) -> Decision<Vec<WeatherAlert>> {
    let alerts: Vec<WeatherAlert> = features
        .into_iter()
        .filter_map(Feature::into_hazard)
        .filter_map(|signal| match signal {
            HazardSignal::Weather(alert) => Some(alert),
            _ => None,
        })
        .collect();
    if alerts.is_empty() {
        Decision::Advance(CascadeState::CheckTraffic)
    } else {
        Decision::Stop(alerts)
    }
}

/// Traffic tier: any resolved road ends the cascade.
pub fn decide_traffic(features: Vec<Feature>) -> Decision<Vec<EvacuationRoute>> {
    let routes: Vec<EvacuationRoute> = features.into_iter().filter_map(Feature::into_route).collect();
    if routes.is_empty() {
        Decision::Advance(CascadeState::Empty)
    } else {
        Decision::Stop(routes)
    }
}

/// The alert that should drive route tagging: lowest safety first, then feed order.
pub fn dominant_alert(alerts: &[WeatherAlert]) -> Option<(HazardCategory, u8)> {
    alerts
        .iter()
        .map(|alert| (classify_weather_event(&alert.event), severity_safety_level(&alert.severity)))
        .min_by_key(|&(_, safety)| safety)
}
