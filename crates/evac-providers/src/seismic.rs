//! USGS FDSN earthquake feed (GeoJSON).

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use evac_core::{Coordinate, Feature, HazardSignal, SeismicEvent};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{fetch_json, lenient_items};
use crate::types::{FeatureProvider, ProviderError};

#[derive(Debug, Deserialize)]
pub struct SeismicResponse {
    features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SeismicFeature {
    geometry: Option<PointGeometry>,
    #[serde(default)]
    properties: SeismicProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct SeismicProperties {
    mag: Option<f64>,
    title: Option<String>,
    place: Option<String>,
    /// Epoch milliseconds
    time: Option<i64>,
}

pub struct SeismicProvider {
    client: Client,
    base_url: String,
    min_magnitude: f64,
    lookback_hours: i64,
    timeout: Duration,
}

impl SeismicProvider {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        min_magnitude: f64,
        lookback_hours: i64,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            min_magnitude,
            lookback_hours: lookback_hours.max(1),
            timeout,
        }
    }

    fn query(&self, center: Coordinate, radius_m: f64) -> Vec<(&'static str, String)> {
        let start = Utc::now() - ChronoDuration::hours(self.lookback_hours);
        vec![
            ("format", "geojson".to_string()),
            ("latitude", format!("{:.5}", center.lat)),
            ("longitude", format!("{:.5}", center.lon)),
            // FDSN caps maxradiuskm at 20001.6
            ("maxradiuskm", format!("{:.1}", (radius_m / 1000.0).clamp(1.0, 20_001.6))),
            ("minmagnitude", format!("{:.1}", self.min_magnitude)),
            ("starttime", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("orderby", "magnitude".to_string()),
        ]
    }
}

/// Parse a raw FDSN GeoJSON body.
pub fn parse_seismic(body: &str) -> Result<Vec<Feature>, ProviderError> {
    let response: SeismicResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::Unparseable(err.to_string()))?;
    Ok(seismic_features(response))
}

fn seismic_features(response: SeismicResponse) -> Vec<Feature> {
    lenient_items::<SeismicFeature>(response.features)
        .into_iter()
        .filter_map(|feature| {
            let epicenter = Coordinate::from_geojson(&feature.geometry?.coordinates)?;
            let props = feature.properties;
            let magnitude = props.mag.filter(|m| m.is_finite())?;
            let title = props.title.or(props.place)?;
            let time = props
                .time
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .unwrap_or_else(Utc::now);
            Some(Feature::Hazard(HazardSignal::Seismic(SeismicEvent {
                magnitude,
                epicenter,
                time,
                title,
            })))
        })
        .collect()
}

#[async_trait]
impl FeatureProvider for SeismicProvider {
    fn name(&self) -> &str {
        "usgs-seismic"
    }

    async fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<Vec<Feature>, ProviderError> {
        let request = self.client.get(&self.base_url).query(&self.query(center, radius_m));
        let response: SeismicResponse = fetch_json(request, self.timeout).await?;
        Ok(seismic_features(response))
    }
}
