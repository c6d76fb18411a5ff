//! Driving directions toward fixed-distance destinations (Google Directions).

use async_trait::async_trait;
use chrono::Utc;
use evac_core::polyline;
use evac_core::{
    destination_point, CompassDirection, Coordinate, EvacuationRoute, Feature, HazardCategory,
    RouteProvenance,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{check_google_status, fetch_json, lenient_items};
use crate::types::{FeatureProvider, ProviderError};

pub const DIRECTIONS_SOURCE: &str = "google-directions";
const DIRECTIONS_SAFETY_LEVEL: u8 = 4;

/// Headings probed for a route, in merge order.
const PROBE_HEADINGS: [CompassDirection; 4] = [
    CompassDirection::North,
    CompassDirection::East,
    CompassDirection::South,
    CompassDirection::West,
];

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: String,
    overview_polyline: EncodedPolyline,
    #[serde(default)]
    legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    duration: TextValue,
    distance: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: u64,
}

pub struct DirectionsProvider {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl DirectionsProvider {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Fetch the first driving route from `origin` to `destination`.
    pub async fn route_to(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        heading: CompassDirection,
    ) -> Result<Option<EvacuationRoute>, ProviderError> {
        let request = self.client.get(&self.base_url).query(&[
            ("origin", format!("{},{}", origin.lat, origin.lon)),
            ("destination", format!("{},{}", destination.lat, destination.lon)),
            ("mode", "driving".to_string()),
            ("key", self.api_key.clone()),
        ]);
        let response: DirectionsResponse = fetch_json(request, self.timeout).await?;
        directions_route(response, heading)
    }
}

/// Parse a raw directions body; `Ok(None)` when no usable route came back.
pub fn parse_directions(body: &str, heading: CompassDirection) -> Result<Option<EvacuationRoute>, ProviderError> {
    let response: DirectionsResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::Unparseable(err.to_string()))?;
    directions_route(response, heading)
}

fn directions_route(
    response: DirectionsResponse,
    heading: CompassDirection,
) -> Result<Option<EvacuationRoute>, ProviderError> {
    check_google_status(&response.status, response.error_message.as_deref())?;

    // First route with a usable polyline and at least one leg.
    let usable = lenient_items::<DirectionsRoute>(response.routes)
        .into_iter()
        .find_map(|route| {
            let waypoints = polyline::decode(&route.overview_polyline.points);
            let valid = waypoints.len() >= 2 && waypoints.iter().all(Coordinate::is_valid);
            let leg = route.legs.first()?;
            valid.then(|| (leg.duration.value, leg.distance.value, waypoints, route.summary.clone()))
        });
    let Some((duration_s, distance_m, waypoints, summary)) = usable else {
        return Ok(None);
    };

    let via = if summary.is_empty() {
        String::new()
    } else {
        format!(" via {summary}")
    };
    Ok(Some(EvacuationRoute {
        id: format!("directions-{}", heading.label()),
        name: format!("Drive {heading}{via}"),
        description: format!(
            "Driving route {:.1} km {heading}, about {} min.",
            distance_m as f64 / 1000.0,
            (duration_s + 59) / 60
        ),
        waypoints,
        hazard: HazardCategory::General,
        estimated_travel_secs: u32::try_from(duration_s.max(1)).unwrap_or(u32::MAX),
        updated_at: Utc::now(),
        safety_level: DIRECTIONS_SAFETY_LEVEL,
        authority: "Google Maps".to_string(),
        source: DIRECTIONS_SOURCE.to_string(),
        provenance: RouteProvenance::Official,
    }))
}

#[async_trait]
impl FeatureProvider for DirectionsProvider {
    fn name(&self) -> &str {
        "google-directions"
    }

    /// One request per cardinal heading at `radius_m`. Partial success is
    /// success; only when every heading fails is the first error returned.
    async fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<Vec<Feature>, ProviderError> {
        let [north, east, south, west] = PROBE_HEADINGS.map(|heading| {
            let destination = destination_point(center, heading.degrees().to_radians(), radius_m);
            self.route_to(center, destination, heading)
        });
        let (north, east, south, west) = tokio::join!(north, east, south, west);

        let mut routes = Vec::new();
        let mut first_error = None;
        for result in [north, east, south, west] {
            match result {
                Ok(Some(route)) => routes.push(Feature::Route(route)),
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!("directions probe failed: {}", err);
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) if routes.is_empty() => Err(err),
            _ => Ok(routes),
        }
    }
}
