pub mod dedup;
pub mod facility;
pub mod hazard;
pub mod models;
pub mod policy;
pub mod polyline;
pub mod spatial;
pub mod synthetic;

pub use dedup::{dedupe_routes, dedupe_safe_zones, routes_coincide};
pub use facility::{FacilityKind, FacilityProfile};
pub use models::{
    Coordinate, CoordinateError, DisasterDeclaration, EvacuationRoute, Feature, HazardCategory,
    HazardSignal, RouteProvenance, SafeZone, SeismicEvent, WeatherAlert,
};
pub use policy::AggregationPolicy;
pub use spatial::{
    bearing_description, destination_point, haversine_distance, initial_bearing, BoundingBox,
    CompassDirection,
};
pub use synthetic::{Spread, SyntheticGenerator};
