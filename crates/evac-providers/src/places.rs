//! Nearby facility search (Google Places).
//!
//! One provider instance per facility kind so a failing category only
//! costs that category.

use async_trait::async_trait;
use chrono::Utc;
use evac_core::{Coordinate, FacilityKind, Feature, SafeZone};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{check_google_status, fetch_json, lenient_items};
use crate::types::{FeatureProvider, ProviderError};

/// Largest radius the nearby search accepts.
const MAX_SEARCH_RADIUS_M: f64 = 50_000.0;

#[derive(Debug, Deserialize)]
pub struct PlacesResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    geometry: PlaceGeometry,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct PlacesProvider {
    client: Client,
    base_url: String,
    api_key: String,
    kind: FacilityKind,
    timeout: Duration,
    name: String,
}

impl PlacesProvider {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        kind: FacilityKind,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            kind,
            timeout,
            name: format!("places-{}", kind.place_type()),
        }
    }

    pub fn kind(&self) -> FacilityKind {
        self.kind
    }
}

/// Parse a raw nearby-search body into zones of `kind`.
pub fn parse_places(body: &str, kind: FacilityKind) -> Result<Vec<Feature>, ProviderError> {
    let response: PlacesResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::Unparseable(err.to_string()))?;
    place_features(response, kind)
}

fn place_features(response: PlacesResponse, kind: FacilityKind) -> Result<Vec<Feature>, ProviderError> {
    check_google_status(&response.status, response.error_message.as_deref())?;

    let profile = kind.profile();
    let zones = lenient_items::<PlaceResult>(response.results)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, place)| {
            let center = Coordinate::new(place.geometry.location.lat, place.geometry.location.lng);
            if !center.is_valid() {
                return None;
            }
            let id = place
                .place_id
                .unwrap_or_else(|| format!("{}-{idx}", kind.place_type()));
            Some(Feature::Zone(SafeZone {
                id,
                description: format!("{} near {}", kind.label(), place.vicinity.as_deref().unwrap_or("your area")),
                name: place.name,
                center,
                radius_m: profile.radius_m,
                capacity: profile.capacity,
                occupancy: 0,
                resources: profile.resource_tags(),
                updated_at: Utc::now(),
                safety_level: profile.safety_level,
                address: place.vicinity,
                contact: place.formatted_phone_number,
                source: "google-places".to_string(),
            }))
        })
        .collect();
    Ok(zones)
}

#[async_trait]
impl FeatureProvider for PlacesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<Vec<Feature>, ProviderError> {
        let request = self.client.get(&self.base_url).query(&[
            ("location", format!("{},{}", center.lat, center.lon)),
            ("radius", format!("{:.0}", radius_m.min(MAX_SEARCH_RADIUS_M))),
            ("type", self.kind.place_type().to_string()),
            ("key", self.api_key.clone()),
        ]);
        let response: PlacesResponse = fetch_json(request, self.timeout).await?;
        place_features(response, self.kind)
    }
}
