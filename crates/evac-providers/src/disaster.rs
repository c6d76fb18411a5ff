//! OpenFEMA disaster declaration summaries.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use evac_core::{Coordinate, DisasterDeclaration, Feature, HazardSignal};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{fetch_json, lenient_items};
use crate::types::{FeatureProvider, ProviderError};

const PAGE_SIZE: u32 = 25;

#[derive(Debug, Deserialize)]
pub struct DeclarationsResponse {
    #[serde(default)]
    metadata: Option<DeclarationsMetadata>,
    #[serde(rename = "DisasterDeclarationsSummaries")]
    summaries: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DeclarationsMetadata {
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclarationSummary {
    disaster_number: Option<u64>,
    declaration_title: Option<String>,
    incident_type: Option<String>,
}

/// Declarations are filed per state, so a state code scopes the query.
pub struct DisasterDeclarationProvider {
    client: Client,
    base_url: String,
    state: String,
    lookback_days: i64,
    timeout: Duration,
}

impl DisasterDeclarationProvider {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        state: impl Into<String>,
        lookback_days: i64,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            state: state.into().trim().to_ascii_uppercase(),
            lookback_days: lookback_days.max(1),
            timeout,
        }
    }

    fn filter(&self) -> String {
        let since = (Utc::now() - ChronoDuration::days(self.lookback_days)).format("%Y-%m-%d");
        format!(
            "state eq '{}' and declarationDate ge '{}T00:00:00.000Z'",
            self.state, since
        )
    }
}

/// Parse a raw declarations body.
pub fn parse_declarations(body: &str) -> Result<Vec<Feature>, ProviderError> {
    let response: DeclarationsResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::Unparseable(err.to_string()))?;
    Ok(declaration_features(response))
}

fn declaration_features(response: DeclarationsResponse) -> Vec<Feature> {
    if let Some(count) = response.metadata.and_then(|m| m.count) {
        tracing::debug!("FEMA reports {} matching declarations", count);
    }

    let mut seen = std::collections::HashSet::new();
    lenient_items::<DeclarationSummary>(response.summaries)
        .into_iter()
        .filter_map(|summary| {
            let number = summary.disaster_number?;
            let title = summary.declaration_title?;
            // Summaries repeat once per designated county.
            if !seen.insert(number) {
                return None;
            }
            Some(Feature::Hazard(HazardSignal::Disaster(DisasterDeclaration {
                id: number.to_string(),
                title,
                incident_type: summary.incident_type.unwrap_or_else(|| "Other".to_string()),
            })))
        })
        .collect()
}

#[async_trait]
impl FeatureProvider for DisasterDeclarationProvider {
    fn name(&self) -> &str {
        "fema-declarations"
    }

    async fn fetch(&self, _center: Coordinate, _radius_m: f64) -> Result<Vec<Feature>, ProviderError> {
        let request = self.client.get(&self.base_url).query(&[
            ("$filter", self.filter()),
            ("$orderby", "declarationDate desc".to_string()),
            ("$top", PAGE_SIZE.to_string()),
        ]);
        let response: DeclarationsResponse = fetch_json(request, self.timeout).await?;
        Ok(declaration_features(response))
    }
}
