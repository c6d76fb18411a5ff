//! Cross-provider deduplication of routes and safe zones.
//!
//! Both passes are order-stable: the result depends only on input order, so
//! callers must establish their merge order before deduplicating.

use std::collections::HashSet;

use crate::models::{EvacuationRoute, RouteProvenance, SafeZone};
use crate::spatial::{haversine_distance, CompassDirection};

/// True when both endpoints of `a` and `b` are within `threshold_m`.
pub fn routes_coincide(a: &EvacuationRoute, b: &EvacuationRoute, threshold_m: f64) -> bool {
    let (Some(start_a), Some(end_a), Some(start_b), Some(end_b)) = (a.start(), a.end(), b.start(), b.end())
    else {
        return false;
    };
    haversine_distance(start_a, start_b) < threshold_m && haversine_distance(end_a, end_b) < threshold_m
}

/// Merge routes that describe the same path.
///
/// Official routes go first (stable within each provenance) and each claims
/// its compass bucket. Any later non-official route is dropped when its bucket
/// is already claimed, even if its endpoints differ. Routes with fewer than
/// two waypoints are discarded.
pub fn dedupe_routes(routes: Vec<EvacuationRoute>, threshold_m: f64) -> Vec<EvacuationRoute> {
    let mut ordered = routes;
    ordered.sort_by_key(|route| route.provenance);

    let mut kept: Vec<EvacuationRoute> = Vec::with_capacity(ordered.len());
    let mut claimed: HashSet<CompassDirection> = HashSet::new();

    for route in ordered {
        if route.waypoints.len() < 2 {
            continue;
        }
        if kept.iter().any(|existing| routes_coincide(existing, &route, threshold_m)) {
            continue;
        }
        let Some(heading) = route.heading() else {
            continue;
        };
        if route.provenance != RouteProvenance::Official && claimed.contains(&heading) {
            continue;
        }
        claimed.insert(heading);
        kept.push(route);
    }

    kept
}

/// Merge zones whose centers are within `threshold_m`; the first one seen wins.
pub fn dedupe_safe_zones(zones: Vec<SafeZone>, threshold_m: f64) -> Vec<SafeZone> {
    let mut kept: Vec<SafeZone> = Vec::with_capacity(zones.len());
    for zone in zones {
        let duplicate = kept
            .iter()
            .any(|existing| haversine_distance(existing.center, zone.center) < threshold_m);
        if !duplicate {
            kept.push(zone);
        }
    }
    kept
}
