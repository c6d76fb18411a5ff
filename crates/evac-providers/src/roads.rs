//! Major roads from OpenStreetMap via the Overpass API.

use async_trait::async_trait;
use chrono::Utc;
use evac_core::{
    bearing_description, haversine_distance, BoundingBox, Coordinate, EvacuationRoute, Feature,
    HazardCategory, RouteProvenance,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::http::fetch_json;
use crate::types::{FeatureProvider, ProviderError};

pub const ROAD_NETWORK_SOURCE: &str = "openstreetmap";

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    elements: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Speed and safety for a `highway=*` class.
fn road_class(highway: &str) -> (f64, u8) {
    match highway {
        "motorway" => (25.0, 4),
        "trunk" => (20.0, 4),
        "primary" => (15.0, 3),
        "secondary" => (11.0, 3),
        _ => (11.0, 2),
    }
}

pub struct RoadNetworkProvider {
    client: Client,
    base_url: String,
    max_span_deg: f64,
    timeout: Duration,
}

impl RoadNetworkProvider {
    pub fn new(client: Client, base_url: impl Into<String>, max_span_deg: f64, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            max_span_deg,
            timeout,
        }
    }

    fn query(&self, center: Coordinate, radius_m: f64) -> String {
        let bbox = BoundingBox::around(center, radius_m, self.max_span_deg).to_overpass();
        let server_timeout_s = self.timeout.as_secs().max(5);
        format!(
            "[out:json][timeout:{server_timeout_s}];\n(\n  way[\"highway\"~\"^(motorway|trunk|primary)$\"]({bbox});\n);\nout body;\n>;\nout skel qt;"
        )
    }
}

/// Parse a raw Overpass body into routes oriented away from `origin`.
pub fn parse_roads(body: &str, origin: Coordinate) -> Result<Vec<Feature>, ProviderError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::Unparseable(err.to_string()))?;
    Ok(road_features(response, origin))
}

fn road_features(response: OverpassResponse, origin: Coordinate) -> Vec<Feature> {
    let elements: Vec<OverpassElement> = response
        .elements
        .into_iter()
        .filter_map(|element| serde_json::from_value(element).ok())
        .collect();

    let nodes: HashMap<i64, Coordinate> = elements
        .iter()
        .filter_map(|element| match element {
            OverpassElement::Node { id, lat, lon } => {
                let point = Coordinate::new(*lat, *lon);
                point.is_valid().then_some((*id, point))
            }
            _ => None,
        })
        .collect();

    let mut roads: Vec<(f64, EvacuationRoute)> = Vec::new();
    for element in elements {
        let OverpassElement::Way { id, nodes: refs, tags } = element else {
            continue;
        };
        let Some(highway) = tags.get("highway") else {
            continue;
        };
        let Some(mut waypoints) = refs
            .iter()
            .map(|node| nodes.get(node).copied())
            .collect::<Option<Vec<_>>>()
        else {
            tracing::debug!("Skipping way {} with unresolved nodes", id);
            continue;
        };
        if waypoints.len() < 2 {
            continue;
        }

        let start_gap = haversine_distance(origin, waypoints[0]);
        let end_gap = haversine_distance(origin, waypoints[waypoints.len() - 1]);
        if end_gap < start_gap {
            waypoints.reverse();
        }
        let nearest_m = start_gap.min(end_gap);

        let (speed_mps, safety_level) = road_class(highway);
        let length_m: f64 = waypoints
            .windows(2)
            .map(|pair| haversine_distance(pair[0], pair[1]))
            .sum();
        let heading = bearing_description(waypoints[0], waypoints[waypoints.len() - 1]);
        let name = tags
            .get("name")
            .or_else(|| tags.get("ref"))
            .cloned()
            .unwrap_or_else(|| format!("{highway} road"));

        roads.push((
            nearest_m,
            EvacuationRoute {
                id: format!("osm-way-{id}"),
                description: format!("Follow {name} {heading} for {:.1} km.", length_m / 1000.0),
                name,
                waypoints,
                hazard: HazardCategory::General,
                estimated_travel_secs: ((length_m / speed_mps).ceil() as u32).max(1),
                updated_at: Utc::now(),
                safety_level,
                authority: "OpenStreetMap contributors".to_string(),
                source: ROAD_NETWORK_SOURCE.to_string(),
                provenance: RouteProvenance::Official,
            },
        ));
    }

    roads.sort_by(|a, b| a.0.total_cmp(&b.0));
    roads.into_iter().map(|(_, route)| Feature::Route(route)).collect()
}

#[async_trait]
impl FeatureProvider for RoadNetworkProvider {
    fn name(&self) -> &str {
        "osm-overpass"
    }

    async fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<Vec<Feature>, ProviderError> {
        let request = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "text/plain")
            .body(self.query(center, radius_m));
        let response: OverpassResponse = fetch_json(request, self.timeout).await?;
        Ok(road_features(response, center))
    }
}
