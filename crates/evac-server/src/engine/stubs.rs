//! In-memory providers for engine and API tests.

use async_trait::async_trait;
use chrono::Utc;
use evac_core::{
    Coordinate, EvacuationRoute, FacilityKind, Feature, HazardCategory, HazardSignal,
    RouteProvenance, SafeZone, SeismicEvent, WeatherAlert,
};
use evac_providers::{FeatureProvider, ProviderError, SharedProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Behavior {
    Features(Vec<Feature>),
    Fail(ProviderError),
    Slow(Duration, Vec<Feature>),
}

pub struct StubProvider {
    name: String,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    fn shared(name: &str, behavior: Behavior) -> SharedProvider {
        Self::counted(name, behavior).0
    }

    fn counted(name: &str, behavior: Behavior) -> (SharedProvider, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider: SharedProvider = Arc::new(StubProvider {
            name: name.to_string(),
            behavior,
            calls: calls.clone(),
        });
        (provider, calls)
    }

    pub fn features(name: &str, features: Vec<Feature>) -> SharedProvider {
        Self::shared(name, Behavior::Features(features))
    }

    pub fn empty(name: &str) -> SharedProvider {
        Self::shared(name, Behavior::Features(Vec::new()))
    }

    /// An empty provider plus a handle counting its calls.
    pub fn counting_empty(name: &str) -> (SharedProvider, Arc<AtomicUsize>) {
        Self::counted(name, Behavior::Features(Vec::new()))
    }

    pub fn failing(name: &str, err: ProviderError) -> SharedProvider {
        Self::shared(name, Behavior::Fail(err))
    }

    /// A single quake titled after the provider.
    pub fn quake(name: &str, magnitude: f64, epicenter: Coordinate) -> SharedProvider {
        Self::features(name, vec![quake_feature(name, magnitude, epicenter)])
    }

    pub fn slow_quake(name: &str, delay: Duration, magnitude: f64, epicenter: Coordinate) -> SharedProvider {
        Self::shared(name, Behavior::Slow(delay, vec![quake_feature(name, magnitude, epicenter)]))
    }
}

#[async_trait]
impl FeatureProvider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _center: Coordinate, _radius_m: f64) -> Result<Vec<Feature>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Features(features) => Ok(features.clone()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Slow(delay, features) => {
                tokio::time::sleep(*delay).await;
                Ok(features.clone())
            }
        }
    }
}

pub fn quake_feature(title: &str, magnitude: f64, epicenter: Coordinate) -> Feature {
    Feature::Hazard(HazardSignal::Seismic(SeismicEvent {
        magnitude,
        epicenter,
        time: Utc::now(),
        title: title.to_string(),
    }))
}

pub fn alert_feature(event: &str, severity: &str) -> Feature {
    Feature::Hazard(HazardSignal::Weather(WeatherAlert {
        id: format!("alert-{event}"),
        event: event.to_string(),
        headline: event.to_string(),
        severity: severity.to_string(),
        description: None,
    }))
}

/// A two-point road from `start` to `end`.
pub fn road_feature(id: &str, start: Coordinate, end: Coordinate, safety_level: u8) -> Feature {
    Feature::Route(EvacuationRoute {
        id: id.to_string(),
        name: format!("Road {id}"),
        description: String::new(),
        waypoints: vec![start, end],
        hazard: HazardCategory::General,
        estimated_travel_secs: 600,
        updated_at: Utc::now(),
        safety_level,
        authority: "OpenStreetMap contributors".to_string(),
        source: "openstreetmap".to_string(),
        provenance: RouteProvenance::Official,
    })
}

pub fn zone_feature(id: &str, kind: FacilityKind, center: Coordinate) -> Feature {
    let profile = kind.profile();
    Feature::Zone(SafeZone {
        id: id.to_string(),
        name: format!("{} {id}", kind.label()),
        description: String::new(),
        center,
        radius_m: profile.radius_m,
        capacity: profile.capacity,
        occupancy: 0,
        resources: profile.resource_tags(),
        updated_at: Utc::now(),
        safety_level: profile.safety_level,
        address: None,
        contact: None,
        source: "google-places".to_string(),
    })
}
