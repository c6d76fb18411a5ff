//! Aggregation engine: provider cascades, merge, and synthetic fallback.
//!
//! The only errors a caller can see are invalid input and its own
//! cancellation. Every provider failure degrades to the next tier and
//! ultimately to synthetic data.

pub mod cascade;
pub mod tier;

#[cfg(test)]
pub(crate) mod stubs;
#[cfg(test)]
mod tests;

use evac_core::{
    dedupe_routes, dedupe_safe_zones, haversine_distance, AggregationPolicy, Coordinate,
    EvacuationRoute, Feature, HazardCategory, HazardSignal, SafeZone, Spread, SyntheticGenerator,
};
use evac_providers::{ProviderSet, SharedProvider};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::engine::cascade::{
    decide_hazards, decide_traffic, decide_weather, dominant_alert, CascadeOutcome, CascadeState,
    Decision,
};
use crate::engine::tier::run_tier;

/// Safety level for routes synthesized from hazards without a location.
const UNLOCATED_HAZARD_SAFETY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("aggregation cancelled")]
    Cancelled,
}

/// One aggregation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationRequest {
    pub center: Coordinate,
    pub radius_m: f64,
    /// Connectivity as observed by the caller.
    pub connected: bool,
    /// Seed for synthetic data. Random when absent.
    pub seed: Option<u64>,
}

impl AggregationRequest {
    pub fn new(center: Coordinate, radius_m: f64) -> Self {
        Self {
            center,
            radius_m,
            connected: true,
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.center
            .validate()
            .map_err(|err| EngineError::InvalidInput(err.to_string()))?;
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "radius must be a positive number of meters, got {}",
                self.radius_m
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteDiscovery {
    pub outcome: CascadeOutcome,
    pub routes: Vec<EvacuationRoute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneOutcome {
    Providers,
    Synthetic,
    Offline,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneDiscovery {
    pub outcome: ZoneOutcome,
    pub zones: Vec<SafeZone>,
}

pub struct Engine {
    providers: ProviderSet,
    policy: AggregationPolicy,
}

impl Engine {
    pub fn new(providers: ProviderSet, policy: AggregationPolicy) -> Self {
        Self { providers, policy }
    }

    pub fn policy(&self) -> &AggregationPolicy {
        &self.policy
    }

    fn generator(&self, seed: Option<u64>) -> SyntheticGenerator {
        match seed {
            Some(seed) => SyntheticGenerator::seeded(seed, self.policy.clone()),
            None => SyntheticGenerator::unseeded(self.policy.clone()),
        }
    }

    async fn tier(
        &self,
        name: &str,
        providers: &[SharedProvider],
        request: &AggregationRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<Feature>, EngineError> {
        let report = run_tier(
            name,
            providers,
            request.center,
            request.radius_m,
            self.policy.provider_timeout(),
            cancel,
        )
        .await?;
        if report.all_failed() {
            tracing::warn!("Tier {}: all {} providers failed", name, report.attempted);
        }
        Ok(report.features)
    }

    /// Walk the hazard, weather and traffic tiers until one produces routes.
    pub async fn discover_routes(
        &self,
        request: &AggregationRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteDiscovery, EngineError> {
        request.validate()?;
        let origin = request.center;
        let mut generator = self.generator(request.seed);

        if !request.connected {
            tracing::info!("Offline request at ({:.4}, {:.4}); using synthetic routes", origin.lat, origin.lon);
            let routes = generator.routes(origin, Spread::Tri, HazardCategory::General);
            return Ok(self.finish_routes(CascadeOutcome::Offline, routes, &mut generator, origin));
        }

        let mut state = CascadeState::CheckHazards;
        loop {
            tracing::debug!("Cascade state {:?}", state);
            state = match state {
                CascadeState::CheckHazards => {
                    let features = self.tier("hazards", &self.providers.hazards, request, cancel).await?;
                    match decide_hazards(features) {
                        Decision::Stop(signals) => {
                            let routes = self.hazard_routes(origin, &signals, &mut generator);
                            return Ok(self.finish_routes(CascadeOutcome::HazardRoutes, routes, &mut generator, origin));
                        }
                        Decision::Advance(next) => next,
                    }
                }
                CascadeState::CheckWeather => {
                    let features = self.tier("weather", &self.providers.weather, request, cancel).await?;
                    match decide_weather(features) {
                        Decision::Stop(alerts) => {
                            let (category, safety) =
                                dominant_alert(&alerts).unwrap_or((HazardCategory::General, UNLOCATED_HAZARD_SAFETY));
                            let routes = self
                                .weather_routes(request, category, safety, &mut generator, cancel)
                                .await?;
                            return Ok(self.finish_routes(CascadeOutcome::WeatherRoutes, routes, &mut generator, origin));
                        }
                        Decision::Advance(next) => next,
                    }
                }
                CascadeState::CheckTraffic => {
                    let features = self.tier("traffic", &self.providers.traffic, request, cancel).await?;
                    match decide_traffic(features) {
                        Decision::Stop(routes) => {
                            return Ok(self.finish_routes(CascadeOutcome::TrafficRoutes, routes, &mut generator, origin));
                        }
                        Decision::Advance(next) => next,
                    }
                }
                CascadeState::Empty => {
                    tracing::info!("All tiers empty; using synthetic routes");
                    let routes = generator.routes(origin, Spread::Tri, HazardCategory::General);
                    return Ok(self.finish_routes(CascadeOutcome::Synthetic, routes, &mut generator, origin));
                }
            };
        }
    }

    fn hazard_routes(
        &self,
        origin: Coordinate,
        signals: &[HazardSignal],
        generator: &mut SyntheticGenerator,
    ) -> Vec<EvacuationRoute> {
        let mut routes = Vec::new();
        let mut spread_categories: Vec<HazardCategory> = Vec::new();
        for signal in signals {
            match signal {
                HazardSignal::Seismic(event) => routes.extend(generator.hazard_routes(
                    origin,
                    event.epicenter,
                    event.magnitude,
                    signal.category(),
                    &event.title,
                )),
                HazardSignal::Weather(_) | HazardSignal::Disaster(_) => {
                    // No point location; one compass spread per category is enough.
                    let category = signal.category();
                    if !spread_categories.contains(&category) {
                        spread_categories.push(category);
                        routes.extend(generator.spread_routes(
                            origin,
                            Spread::Compass,
                            category,
                            UNLOCATED_HAZARD_SAFETY,
                        ));
                    }
                }
            }
        }
        routes
    }

    async fn weather_routes(
        &self,
        request: &AggregationRequest,
        category: HazardCategory,
        safety: u8,
        generator: &mut SyntheticGenerator,
        cancel: &CancellationToken,
    ) -> Result<Vec<EvacuationRoute>, EngineError> {
        let features = self
            .tier("directions", &self.providers.directions, request, cancel)
            .await?;
        let mut routes: Vec<EvacuationRoute> = features.into_iter().filter_map(Feature::into_route).collect();
        if routes.is_empty() {
            tracing::info!("No directions available; spreading {} routes", category.label());
            return Ok(generator.spread_routes(request.center, Spread::Compass, category, safety));
        }
        for route in &mut routes {
            route.hazard = category;
        }
        Ok(routes)
    }

    /// Dedupe, order by descending safety, cap. Never returns an empty set.
    fn finish_routes(
        &self,
        outcome: CascadeOutcome,
        routes: Vec<EvacuationRoute>,
        generator: &mut SyntheticGenerator,
        origin: Coordinate,
    ) -> RouteDiscovery {
        let mut merged = dedupe_routes(routes, self.policy.route_dedup_m);
        let outcome = if merged.is_empty() {
            tracing::warn!("{:?} produced no usable routes; using synthetic routes", outcome);
            merged = generator.routes(origin, Spread::Tri, HazardCategory::General);
            if outcome == CascadeOutcome::Offline {
                outcome
            } else {
                CascadeOutcome::Synthetic
            }
        } else {
            outcome
        };
        merged.sort_by(|a, b| b.safety_level.cmp(&a.safety_level));
        merged.truncate(self.policy.max_routes.max(1));
        tracing::info!("Route discovery finished: {:?}, {} routes", outcome, merged.len());
        RouteDiscovery {
            outcome,
            routes: merged,
        }
    }

    /// Fan out over every facility provider; fall back to synthetic zones.
    pub async fn discover_safe_zones(
        &self,
        request: &AggregationRequest,
        cancel: &CancellationToken,
    ) -> Result<ZoneDiscovery, EngineError> {
        request.validate()?;
        let origin = request.center;

        if !request.connected {
            let zones = self.generator(request.seed).safe_zones(origin);
            return Ok(ZoneDiscovery {
                outcome: ZoneOutcome::Offline,
                zones,
            });
        }

        let features = self.tier("places", &self.providers.places, request, cancel).await?;
        let zones: Vec<SafeZone> = features.into_iter().filter_map(Feature::into_zone).collect();
        let mut zones = dedupe_safe_zones(zones, self.policy.zone_dedup_m);
        if zones.is_empty() {
            tracing::info!("No safe zones from providers; using synthetic zones");
            return Ok(ZoneDiscovery {
                outcome: ZoneOutcome::Synthetic,
                zones: self.generator(request.seed).safe_zones(origin),
            });
        }

        zones.sort_by(|a, b| {
            haversine_distance(origin, a.center).total_cmp(&haversine_distance(origin, b.center))
        });
        zones.truncate(self.policy.max_safe_zones.max(1));
        tracing::info!("Safe-zone discovery finished: {} zones", zones.len());
        Ok(ZoneDiscovery {
            outcome: ZoneOutcome::Providers,
            zones,
        })
    }
}
