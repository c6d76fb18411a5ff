//! REST API routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use evac_core::{haversine_distance, polyline, CompassDirection, Coordinate, EvacuationRoute, SafeZone};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::cascade::CascadeOutcome;
use crate::engine::{AggregationRequest, EngineError, RouteDiscovery, ZoneDiscovery, ZoneOutcome};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/evacuation-routes", get(get_evacuation_routes))
        .route("/v1/safe-zones", get(get_safe_zones))
}

/// Query shared by both discovery endpoints.
#[derive(Debug, Deserialize)]
pub struct AggregationQuery {
    pub lat: f64,
    pub lon: f64,
    /// Defaults to the configured radius
    pub radius_m: Option<f64>,
    /// Defaults to true
    pub connected: Option<bool>,
    /// Fixes synthetic output
    pub seed: Option<u64>,
}

impl AggregationQuery {
    fn to_request(&self, default_radius_m: f64) -> AggregationRequest {
        AggregationRequest {
            center: Coordinate::new(self.lat, self.lon),
            radius_m: self.radius_m.unwrap_or(default_radius_m),
            connected: self.connected.unwrap_or(true),
            seed: self.seed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteView {
    #[serde(flatten)]
    pub route: EvacuationRoute,
    pub heading: Option<CompassDirection>,
    pub length_m: f64,
    pub overview_polyline: String,
}

impl From<EvacuationRoute> for RouteView {
    fn from(route: EvacuationRoute) -> Self {
        Self {
            heading: route.heading(),
            length_m: route.length_m(),
            overview_polyline: polyline::encode(&route.waypoints),
            route,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub outcome: CascadeOutcome,
    pub synthetic: bool,
    pub routes: Vec<RouteView>,
}

impl From<RouteDiscovery> for RoutesResponse {
    fn from(discovery: RouteDiscovery) -> Self {
        Self {
            outcome: discovery.outcome,
            synthetic: discovery.outcome.is_synthetic(),
            routes: discovery.routes.into_iter().map(RouteView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ZoneView {
    #[serde(flatten)]
    pub zone: SafeZone,
    pub distance_m: f64,
    pub occupancy_ratio: f64,
    pub over_capacity: bool,
}

#[derive(Debug, Serialize)]
pub struct ZonesResponse {
    pub outcome: ZoneOutcome,
    pub synthetic: bool,
    pub zones: Vec<ZoneView>,
}

impl ZonesResponse {
    pub fn from_discovery(discovery: ZoneDiscovery, origin: Coordinate) -> Self {
        Self {
            synthetic: discovery.outcome != ZoneOutcome::Providers,
            outcome: discovery.outcome,
            zones: discovery
                .zones
                .into_iter()
                .map(|zone| ZoneView {
                    distance_m: haversine_distance(origin, zone.center),
                    occupancy_ratio: zone.occupancy_ratio(),
                    over_capacity: zone.is_over_capacity(),
                    zone,
                })
                .collect(),
        }
    }
}

pub struct ApiError(EngineError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            EngineError::InvalidInput(details) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Invalid input",
                    "details": details
                })),
            )
                .into_response(),
            EngineError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": "Aggregation cancelled"
                })),
            )
                .into_response(),
        }
    }
}

async fn get_evacuation_routes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AggregationQuery>,
) -> Result<Json<RoutesResponse>, ApiError> {
    let request = query.to_request(state.default_radius_m);
    // Dropping the handler (client went away) cancels outstanding provider calls.
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let discovery = state
        .engine
        .discover_routes(&request, &cancel)
        .await
        .map_err(ApiError)?;
    Ok(Json(RoutesResponse::from(discovery)))
}

async fn get_safe_zones(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AggregationQuery>,
) -> Result<Json<ZonesResponse>, ApiError> {
    let request = query.to_request(state.default_radius_m);
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let discovery = state
        .engine
        .discover_safe_zones(&request, &cancel)
        .await
        .map_err(ApiError)?;
    Ok(Json(ZonesResponse::from_discovery(discovery, request.center)))
}
