//! Build the provider roster from settings.

use evac_core::FacilityKind;
use std::sync::Arc;

use crate::directions::DirectionsProvider;
use crate::disaster::DisasterDeclarationProvider;
use crate::http::build_client;
use crate::places::PlacesProvider;
use crate::roads::RoadNetworkProvider;
use crate::seismic::SeismicProvider;
use crate::settings::ProviderSettings;
use crate::types::{FeatureProvider, ProviderError};
use crate::weather::WeatherAlertProvider;

pub type SharedProvider = Arc<dyn FeatureProvider>;

/// Providers grouped by the cascade tier that consults them.
///
/// Order inside each group is merge order.
#[derive(Clone, Default)]
pub struct ProviderSet {
    pub hazards: Vec<SharedProvider>,
    pub weather: Vec<SharedProvider>,
    pub directions: Vec<SharedProvider>,
    pub traffic: Vec<SharedProvider>,
    pub places: Vec<SharedProvider>,
}

impl ProviderSet {
    /// Providers without their required credentials or scope are left out.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = build_client(settings.timeout, &settings.user_agent)?;
        let timeout = settings.timeout;

        let mut hazards: Vec<SharedProvider> = vec![Arc::new(SeismicProvider::new(
            client.clone(),
            &settings.seismic_url,
            settings.seismic_min_magnitude,
            settings.seismic_lookback_hours,
            timeout,
        ))];
        match settings.disaster_state.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(state) => hazards.push(Arc::new(DisasterDeclarationProvider::new(
                client.clone(),
                &settings.disaster_url,
                state,
                settings.disaster_lookback_days,
                timeout,
            ))),
            None => tracing::info!("No disaster state configured; declarations disabled"),
        }

        let weather: Vec<SharedProvider> = vec![Arc::new(WeatherAlertProvider::new(
            client.clone(),
            &settings.weather_url,
            timeout,
        ))];

        let traffic: Vec<SharedProvider> = vec![Arc::new(RoadNetworkProvider::new(
            client.clone(),
            &settings.overpass_url,
            settings.overpass_max_span_deg,
            timeout,
        ))];

        let (directions, places) = match settings.maps_api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let directions: Vec<SharedProvider> = vec![Arc::new(DirectionsProvider::new(
                    client.clone(),
                    &settings.directions_url,
                    key,
                    timeout,
                ))];
                let places = FacilityKind::SEARCHABLE
                    .iter()
                    .map(|&kind| {
                        Arc::new(PlacesProvider::new(
                            client.clone(),
                            &settings.places_url,
                            key,
                            kind,
                            timeout,
                        )) as SharedProvider
                    })
                    .collect();
                (directions, places)
            }
            None => {
                tracing::warn!("No maps API key configured; places and directions disabled");
                (Vec::new(), Vec::new())
            }
        };

        Ok(Self {
            hazards,
            weather,
            directions,
            traffic,
            places,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
            && self.weather.is_empty()
            && self.directions.is_empty()
            && self.traffic.is_empty()
            && self.places.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(providers: &[SharedProvider]) -> Vec<String> {
        providers.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn defaults_skip_keyed_and_scoped_providers() {
        let set = ProviderSet::from_settings(&ProviderSettings::default()).unwrap();
        assert_eq!(names(&set.hazards), vec!["usgs-seismic"]);
        assert_eq!(names(&set.weather), vec!["nws-alerts"]);
        assert_eq!(names(&set.traffic), vec!["osm-overpass"]);
        assert!(set.directions.is_empty());
        assert!(set.places.is_empty());
    }

    #[test]
    fn key_and_state_enable_everything() {
        let settings = ProviderSettings {
            maps_api_key: Some("test-key".to_string()),
            disaster_state: Some("ca".to_string()),
            ..ProviderSettings::default()
        };
        let set = ProviderSet::from_settings(&settings).unwrap();
        assert_eq!(names(&set.hazards), vec!["usgs-seismic", "fema-declarations"]);
        assert_eq!(names(&set.directions), vec!["google-directions"]);
        assert_eq!(
            names(&set.places),
            vec!["places-hospital", "places-fire_station", "places-police", "places-school"]
        );
    }

    #[test]
    fn empty_set() {
        assert!(ProviderSet::default().is_empty());
    }
}
