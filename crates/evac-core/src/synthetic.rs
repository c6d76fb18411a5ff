//! Synthetic routes and safe zones for when no provider has data.
//!
//! Shapes are fixed; parameters that vary (ids, zone placement, occupancy)
//! come from a seeded generator so results are reproducible per seed.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::facility::FacilityKind;
use crate::hazard::{magnitude_reach_m, magnitude_safety_level};
use crate::models::{
    clamp_safety_level, Coordinate, EvacuationRoute, HazardCategory, RouteProvenance, SafeZone,
};
use crate::policy::AggregationPolicy;
use crate::spatial::{
    bearing_description, destination_point, haversine_distance, initial_bearing, CompassDirection,
};

pub const SYNTHETIC_SOURCE: &str = "synthetic";
pub const HAZARD_PROJECTION_SOURCE: &str = "hazard-projection";
const NEUTRAL_SAFETY_LEVEL: u8 = 3;
const FLANK_OFFSET_DEG: f64 = 45.0;

/// Which set of headings to spread synthetic routes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    /// 0°, 120°, 240°
    Tri,
    /// The eight cardinal and intercardinal headings.
    Compass,
}

impl Spread {
    pub fn bearings_deg(self) -> &'static [f64] {
        match self {
            Self::Tri => &[0.0, 120.0, 240.0],
            Self::Compass => &[0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0],
        }
    }
}

/// Seeded producer of fallback data.
pub struct SyntheticGenerator {
    rng: StdRng,
    policy: AggregationPolicy,
}

impl SyntheticGenerator {
    pub fn seeded(seed: u64, policy: AggregationPolicy) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            policy,
        }
    }

    /// Seed from the thread-local generator. Not for tests.
    pub fn unseeded(policy: AggregationPolicy) -> Self {
        Self::seeded(rand::random(), policy)
    }

    /// Directionless routes at neutral safety.
    pub fn routes(&mut self, origin: Coordinate, spread: Spread, hazard: HazardCategory) -> Vec<EvacuationRoute> {
        self.spread_routes(origin, spread, hazard, NEUTRAL_SAFETY_LEVEL)
    }

    /// Routes over `spread`, each reaching the configured synthetic distance.
    pub fn spread_routes(
        &mut self,
        origin: Coordinate,
        spread: Spread,
        hazard: HazardCategory,
        safety_level: u8,
    ) -> Vec<EvacuationRoute> {
        let reach_m = self.policy.synthetic_reach_m;
        spread
            .bearings_deg()
            .iter()
            .map(|&bearing_deg| {
                let waypoints = self.ray(origin, bearing_deg.to_radians(), reach_m);
                let heading = CompassDirection::from_degrees(bearing_deg);
                EvacuationRoute {
                    id: self.next_id("synthetic-route"),
                    name: format!("Head {heading}"),
                    description: format!(
                        "Estimated route {:.1} km {heading} of your position. No live routing data was available.",
                        reach_m / 1000.0
                    ),
                    waypoints,
                    hazard,
                    estimated_travel_secs: self.policy.travel_secs(reach_m),
                    updated_at: Utc::now(),
                    safety_level: clamp_safety_level(safety_level as i64),
                    authority: "Estimated (no live data)".to_string(),
                    source: SYNTHETIC_SOURCE.to_string(),
                    provenance: RouteProvenance::Synthetic,
                }
            })
            .collect()
    }

    /// Routes leading away from a hazard point, reach and safety scaled by magnitude.
    ///
    /// Produces the direct escape heading plus two flanks 45° either side. The
    /// flanks rate one level lower. When the caller stands on the hazard point
    /// there is no "away", so the tri spread is used instead.
    pub fn hazard_routes(
        &mut self,
        origin: Coordinate,
        hazard_point: Coordinate,
        magnitude: f64,
        category: HazardCategory,
        hazard_title: &str,
    ) -> Vec<EvacuationRoute> {
        let safety = magnitude_safety_level(magnitude);
        let reach_m = magnitude_reach_m(
            magnitude,
            self.policy.hazard_min_reach_m,
            self.policy.hazard_max_reach_m,
        );

        let headings: Vec<(f64, u8)> = if haversine_distance(origin, hazard_point) < 1.0 {
            Spread::Tri
                .bearings_deg()
                .iter()
                .map(|deg| (deg.to_radians(), safety))
                .collect()
        } else {
            let away = initial_bearing(hazard_point, origin);
            let flank = FLANK_OFFSET_DEG.to_radians();
            let flank_safety = clamp_safety_level(safety as i64 - 1);
            vec![(away, safety), (away - flank, flank_safety), (away + flank, flank_safety)]
        };

        headings
            .into_iter()
            .map(|(bearing_rad, safety_level)| {
                let waypoints = self.ray(origin, bearing_rad, reach_m);
                let heading = CompassDirection::from_degrees(bearing_rad.to_degrees());
                EvacuationRoute {
                    id: self.next_id("hazard-route"),
                    name: format!("Evacuate {heading}"),
                    description: format!(
                        "Head {heading} for {:.1} km, away from {hazard_title}.",
                        reach_m / 1000.0
                    ),
                    waypoints,
                    hazard: category,
                    estimated_travel_secs: self.policy.travel_secs(reach_m),
                    updated_at: Utc::now(),
                    safety_level,
                    authority: "Derived from live hazard data".to_string(),
                    source: HAZARD_PROJECTION_SOURCE.to_string(),
                    provenance: RouteProvenance::Derived,
                }
            })
            .collect()
    }

    /// Three plausible shelters on evenly spaced bearings around `origin`.
    pub fn safe_zones(&mut self, origin: Coordinate) -> Vec<SafeZone> {
        let phase_deg: f64 = self.rng.random_range(0.0..120.0);
        let min_m = self.policy.synthetic_zone_min_m;
        let max_m = self.policy.synthetic_zone_max_m.max(min_m);
        let count = FacilityKind::SYNTHETIC.len() as f64;

        FacilityKind::SYNTHETIC
            .iter()
            .enumerate()
            .map(|(idx, &kind)| {
                let bearing_deg = phase_deg + idx as f64 * 360.0 / count;
                let distance_m: f64 = self.rng.random_range(min_m..=max_m);
                let center = destination_point(origin, bearing_deg.to_radians(), distance_m);
                let profile = kind.profile();
                let occupancy = self.rng.random_range(0..=profile.capacity / 2);
                let heading = bearing_description(origin, center);
                SafeZone {
                    id: self.next_id("synthetic-zone"),
                    name: format!("{} shelter ({heading})", kind.label()),
                    description: format!(
                        "Estimated {} about {:.1} km {heading}. Confirm with local authorities.",
                        kind.label().to_ascii_lowercase(),
                        distance_m / 1000.0
                    ),
                    center,
                    radius_m: profile.radius_m,
                    capacity: profile.capacity,
                    occupancy,
                    resources: profile.resource_tags(),
                    updated_at: Utc::now(),
                    safety_level: profile.safety_level,
                    address: None,
                    contact: None,
                    source: SYNTHETIC_SOURCE.to_string(),
                }
            })
            .collect()
    }

    /// Origin followed by points every `synthetic_step_m` out to `reach_m`.
    fn ray(&self, origin: Coordinate, bearing_rad: f64, reach_m: f64) -> Vec<Coordinate> {
        let step_m = self.policy.synthetic_step_m.max(1.0);
        let steps = (reach_m / step_m).ceil().max(1.0) as usize;
        let mut points = Vec::with_capacity(steps + 1);
        points.push(origin);
        for step in 1..=steps {
            let distance_m = (step as f64 * step_m).min(reach_m);
            points.push(destination_point(origin, bearing_rad, distance_m));
        }
        points
    }

    fn next_id(&mut self, prefix: &str) -> String {
        format!("{prefix}-{:016x}", self.rng.random::<u64>())
    }
}
