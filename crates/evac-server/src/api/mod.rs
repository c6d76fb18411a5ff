//! HTTP API for the aggregation engine.

mod routes;

pub use routes::{AggregationQuery, RouteView, RoutesResponse, ZoneView, ZonesResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}
