//! National Weather Service active alerts (GeoJSON).

use async_trait::async_trait;
use evac_core::{Coordinate, Feature, HazardSignal, WeatherAlert};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{fetch_json, lenient_items};
use crate::types::{FeatureProvider, ProviderError};

#[derive(Debug, Deserialize)]
pub struct AlertsResponse {
    features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
struct AlertProperties {
    id: Option<String>,
    event: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    severity: Option<String>,
}

pub struct WeatherAlertProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl WeatherAlertProvider {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }
}

/// Parse a raw alerts body.
pub fn parse_alerts(body: &str) -> Result<Vec<Feature>, ProviderError> {
    let response: AlertsResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::Unparseable(err.to_string()))?;
    Ok(alert_features(response))
}

fn alert_features(response: AlertsResponse) -> Vec<Feature> {
    lenient_items::<AlertFeature>(response.features)
        .into_iter()
        .filter_map(|feature| {
            let props = feature.properties;
            let id = props.id?;
            let event = props.event.filter(|event| !event.trim().is_empty())?;
            Some(Feature::Hazard(HazardSignal::Weather(WeatherAlert {
                id,
                headline: props.headline.unwrap_or_else(|| event.clone()),
                event,
                severity: props.severity.unwrap_or_else(|| "Unknown".to_string()),
                description: props.description,
            })))
        })
        .collect()
}

#[async_trait]
impl FeatureProvider for WeatherAlertProvider {
    fn name(&self) -> &str {
        "nws-alerts"
    }

    // Alerts are zone-based; the point lookup already covers the caller's area.
    async fn fetch(&self, center: Coordinate, _radius_m: f64) -> Result<Vec<Feature>, ProviderError> {
        let request = self
            .client
            .get(&self.base_url)
            .header("Accept", "application/geo+json")
            .query(&[("point", format!("{:.4},{:.4}", center.lat, center.lon))]);
        let response: AlertsResponse = fetch_json(request, self.timeout).await?;
        Ok(alert_features(response))
    }
}
