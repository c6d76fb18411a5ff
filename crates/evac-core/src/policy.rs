//! Thresholds and limits for aggregation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for merge, cap and synthesis behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationPolicy {
    /// Routes whose starts and ends are both closer than this are the same route
    pub route_dedup_m: f64,
    /// Safe zones whose centers are closer than this are the same zone
    pub zone_dedup_m: f64,
    /// Upper bound on routes returned to the caller
    pub max_routes: usize,
    /// Upper bound on safe zones returned to the caller
    pub max_safe_zones: usize,
    /// Per-provider call timeout (seconds)
    pub provider_timeout_secs: u64,
    /// Spacing between synthetic waypoints
    pub synthetic_step_m: f64,
    /// Reach of directionless synthetic routes
    pub synthetic_reach_m: f64,
    /// Bounds for magnitude-scaled hazard routes
    pub hazard_min_reach_m: f64,
    pub hazard_max_reach_m: f64,
    /// Average evacuation speed used for travel-time estimates
    pub evacuation_speed_mps: f64,
    /// Synthetic safe zones are placed between these distances
    pub synthetic_zone_min_m: f64,
    pub synthetic_zone_max_m: f64,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            route_dedup_m: 300.0,
            zone_dedup_m: 100.0,
            max_routes: 5,
            max_safe_zones: 10,
            provider_timeout_secs: 10,
            synthetic_step_m: 500.0,
            synthetic_reach_m: 10_000.0,
            hazard_min_reach_m: 2_000.0,
            hazard_max_reach_m: 20_000.0,
            evacuation_speed_mps: 8.9, // ~20 mph in congested evacuation traffic
            synthetic_zone_min_m: 1_000.0,
            synthetic_zone_max_m: 3_000.0,
        }
    }
}

impl AggregationPolicy {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.max(1))
    }

    /// Whole seconds to cover `distance_m`, never zero.
    pub fn travel_secs(&self, distance_m: f64) -> u32 {
        let speed = self.evacuation_speed_mps.max(0.1);
        let secs = (distance_m.max(0.0) / speed).ceil();
        (secs as u32).max(1)
    }
}
