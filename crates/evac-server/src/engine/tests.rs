use evac_core::{
    destination_point, haversine_distance, AggregationPolicy, Coordinate, FacilityKind,
    HazardCategory, RouteProvenance,
};
use evac_providers::{ProviderError, ProviderSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::cascade::CascadeOutcome;
use super::stubs::{alert_feature, road_feature, zone_feature, StubProvider};
use super::{AggregationRequest, Engine, EngineError, ZoneOutcome};

const ORIGIN: Coordinate = Coordinate::new(37.7749, -122.4194);

fn engine(providers: ProviderSet) -> Engine {
    Engine::new(providers, AggregationPolicy::default())
}

fn request(center: Coordinate) -> AggregationRequest {
    AggregationRequest {
        seed: Some(42),
        ..AggregationRequest::new(center, 10_000.0)
    }
}

fn toward(bearing_deg: f64, distance_m: f64) -> Coordinate {
    destination_point(ORIGIN, bearing_deg.to_radians(), distance_m)
}

fn all_failing() -> ProviderSet {
    let fail = |name: &str| StubProvider::failing(name, ProviderError::Network("connection refused".into()));
    ProviderSet {
        hazards: vec![fail("seismic"), fail("declarations")],
        weather: vec![fail("alerts")],
        directions: vec![fail("directions")],
        traffic: vec![fail("roads")],
        places: FacilityKind::SEARCHABLE.iter().map(|k| fail(k.place_type())).collect(),
    }
}

#[tokio::test]
async fn seismic_event_yields_routes_away_from_epicenter() {
    let engine = engine(ProviderSet {
        hazards: vec![StubProvider::quake("usgs", 6.0, Coordinate::new(37.70, -122.45))],
        weather: vec![StubProvider::empty("alerts")],
        traffic: vec![StubProvider::empty("roads")],
        ..ProviderSet::default()
    });

    let discovery = engine
        .discover_routes(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(discovery.outcome, CascadeOutcome::HazardRoutes);
    assert!(!discovery.routes.is_empty());
    assert!(discovery
        .routes
        .iter()
        .any(|route| route.waypoints[0] == ORIGIN && route.safety_level == 1));
    assert!(discovery.routes.iter().all(|r| r.hazard == HazardCategory::Earthquake));
}

#[tokio::test]
async fn traffic_tier_routes_are_capped_and_sorted() {
    let roads = vec![
        road_feature("north", ORIGIN, toward(0.0, 5_000.0), 2),
        road_feature("east", ORIGIN, toward(90.0, 5_000.0), 4),
        road_feature("south", ORIGIN, toward(180.0, 5_000.0), 3),
    ];
    let engine = engine(ProviderSet {
        hazards: vec![StubProvider::empty("seismic")],
        weather: vec![StubProvider::empty("alerts")],
        traffic: vec![StubProvider::features("roads", roads)],
        ..ProviderSet::default()
    });

    let discovery = engine
        .discover_routes(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(discovery.outcome, CascadeOutcome::TrafficRoutes);
    assert!(discovery.routes.len() <= 5);
    let safety: Vec<u8> = discovery.routes.iter().map(|r| r.safety_level).collect();
    assert_eq!(safety, vec![4, 3, 2]);
}

#[tokio::test]
async fn cap_applies_after_dedup() {
    let roads = (0..8)
        .map(|i| road_feature(&format!("r{i}"), ORIGIN, toward(i as f64 * 45.0, 5_000.0), 3))
        .collect();
    let engine = engine(ProviderSet {
        traffic: vec![StubProvider::features("roads", roads)],
        ..ProviderSet::default()
    });
    let discovery = engine
        .discover_routes(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(discovery.routes.len(), 5);
}

#[tokio::test]
async fn every_tier_failing_still_returns_data() {
    let engine = engine(all_failing());
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..100 {
        let center = Coordinate::new(rng.random_range(-80.0..80.0), rng.random_range(-180.0..180.0));
        let req = AggregationRequest {
            seed: Some(rng.random()),
            ..AggregationRequest::new(center, 5_000.0)
        };
        let cancel = CancellationToken::new();

        let routes = engine.discover_routes(&req, &cancel).await.unwrap();
        assert_eq!(routes.outcome, CascadeOutcome::Synthetic);
        assert!(!routes.routes.is_empty());
        assert!(routes.routes.iter().all(|r| r.is_consistent()), "{center:?}");

        let zones = engine.discover_safe_zones(&req, &cancel).await.unwrap();
        assert_eq!(zones.outcome, ZoneOutcome::Synthetic);
        assert!(!zones.zones.is_empty());
        assert!(zones.zones.iter().all(|z| z.is_consistent()), "{center:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn hung_hazard_provider_times_out_and_cascade_continues() {
    let engine = engine(ProviderSet {
        hazards: vec![StubProvider::slow_quake(
            "hung",
            Duration::from_secs(600),
            5.0,
            Coordinate::new(37.7, -122.4),
        )],
        weather: vec![StubProvider::empty("alerts")],
        traffic: vec![StubProvider::features(
            "roads",
            vec![road_feature("r", ORIGIN, toward(45.0, 3_000.0), 4)],
        )],
        ..ProviderSet::default()
    });

    let discovery = engine
        .discover_routes(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(discovery.outcome, CascadeOutcome::TrafficRoutes);
    assert_eq!(discovery.routes[0].id, "r");
}

#[tokio::test]
async fn weather_alert_without_directions_spreads_tagged_routes() {
    let engine = engine(ProviderSet {
        hazards: vec![StubProvider::empty("seismic")],
        weather: vec![StubProvider::features(
            "alerts",
            vec![
                alert_feature("Wind Advisory", "Minor"),
                alert_feature("Flash Flood Warning", "Severe"),
            ],
        )],
        directions: vec![StubProvider::failing("directions", ProviderError::Timeout)],
        ..ProviderSet::default()
    });

    let discovery = engine
        .discover_routes(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(discovery.outcome, CascadeOutcome::WeatherRoutes);
    assert_eq!(discovery.routes.len(), 5);
    assert!(discovery.routes.iter().all(|r| r.hazard == HazardCategory::Flood));
    assert!(discovery.routes.iter().all(|r| r.safety_level == 2));
}

#[tokio::test]
async fn weather_directions_are_retagged() {
    let engine = engine(ProviderSet {
        weather: vec![StubProvider::features("alerts", vec![alert_feature("Red Flag Warning", "Extreme")])],
        directions: vec![StubProvider::features(
            "directions",
            vec![road_feature("directions-north", ORIGIN, toward(0.0, 10_000.0), 4)],
        )],
        ..ProviderSet::default()
    });

    let discovery = engine
        .discover_routes(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(discovery.outcome, CascadeOutcome::WeatherRoutes);
    assert_eq!(discovery.routes.len(), 1);
    assert_eq!(discovery.routes[0].hazard, HazardCategory::Fire);
    assert_eq!(discovery.routes[0].provenance, RouteProvenance::Official);
}

#[tokio::test]
async fn declaration_without_location_spreads_by_category() {
    let declaration = evac_core::Feature::Hazard(evac_core::HazardSignal::Disaster(
        evac_core::DisasterDeclaration {
            id: "4707".to_string(),
            title: "WILDFIRES".to_string(),
            incident_type: "Fire".to_string(),
        },
    ));
    let engine = engine(ProviderSet {
        hazards: vec![StubProvider::features("declarations", vec![declaration.clone(), declaration])],
        ..ProviderSet::default()
    });

    let discovery = engine
        .discover_routes(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(discovery.outcome, CascadeOutcome::HazardRoutes);
    assert_eq!(discovery.routes.len(), 5);
    assert!(discovery.routes.iter().all(|r| r.hazard == HazardCategory::Fire && r.safety_level == 3));
}

#[tokio::test]
async fn offline_skips_every_provider() {
    let (seismic, seismic_calls) = StubProvider::counting_empty("seismic");
    let (places, places_calls) = StubProvider::counting_empty("places");
    let engine = engine(ProviderSet {
        hazards: vec![seismic],
        places: vec![places],
        ..ProviderSet::default()
    });
    let req = AggregationRequest {
        connected: false,
        ..request(ORIGIN)
    };

    let routes = engine.discover_routes(&req, &CancellationToken::new()).await.unwrap();
    let zones = engine.discover_safe_zones(&req, &CancellationToken::new()).await.unwrap();

    assert_eq!(routes.outcome, CascadeOutcome::Offline);
    assert_eq!(routes.routes.len(), 3);
    assert_eq!(zones.outcome, ZoneOutcome::Offline);
    assert_eq!(zones.zones.len(), 3);
    assert_eq!(seismic_calls.load(Ordering::SeqCst), 0);
    assert_eq!(places_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_call() {
    let (seismic, calls) = StubProvider::counting_empty("seismic");
    let engine = engine(ProviderSet {
        hazards: vec![seismic],
        ..ProviderSet::default()
    });
    let cancel = CancellationToken::new();

    for center in [
        Coordinate::new(91.0, 0.0),
        Coordinate::new(0.0, 181.0),
        Coordinate::new(f64::NAN, 0.0),
    ] {
        let err = engine.discover_routes(&request(center), &cancel).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
    let zero_radius = AggregationRequest::new(ORIGIN, 0.0);
    assert!(matches!(
        engine.discover_safe_zones(&zero_radius, &cancel).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_token_stops_discovery() {
    let engine = engine(ProviderSet {
        hazards: vec![StubProvider::slow_quake(
            "hung",
            Duration::from_secs(60),
            4.0,
            Coordinate::new(37.7, -122.4),
        )],
        ..ProviderSet::default()
    });
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = engine.discover_routes(&request(ORIGIN), &cancel).await.unwrap_err();
    assert_eq!(err, EngineError::Cancelled);

    let already = CancellationToken::new();
    already.cancel();
    let err = engine.discover_safe_zones(&request(ORIGIN), &already).await.unwrap_err();
    assert_eq!(err, EngineError::Cancelled);
}

#[tokio::test]
async fn safe_zones_tolerate_partial_failure() {
    let far_hospital = toward(0.0, 2_000.0);
    let engine = engine(ProviderSet {
        places: vec![
            StubProvider::features(
                "places-hospital",
                vec![
                    zone_feature("a", FacilityKind::Hospital, far_hospital),
                    zone_feature("b", FacilityKind::Hospital, toward(90.0, 500.0)),
                ],
            ),
            StubProvider::failing(
                "places-fire_station",
                ProviderError::Rejected {
                    status: "OVER_QUERY_LIMIT".to_string(),
                    message: "quota".to_string(),
                },
            ),
            StubProvider::features(
                "places-police",
                vec![zone_feature(
                    "c",
                    FacilityKind::Police,
                    destination_point(far_hospital, 0.0, 50.0),
                )],
            ),
            StubProvider::empty("places-school"),
        ],
        ..ProviderSet::default()
    });

    let discovery = engine
        .discover_safe_zones(&request(ORIGIN), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(discovery.outcome, ZoneOutcome::Providers);
    let ids: Vec<&str> = discovery.zones.iter().map(|z| z.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert!(haversine_distance(ORIGIN, discovery.zones[0].center) < haversine_distance(ORIGIN, discovery.zones[1].center));
}

#[tokio::test]
async fn seeded_requests_are_reproducible() {
    let engine = engine(ProviderSet::default());
    let cancel = CancellationToken::new();
    let a = engine.discover_safe_zones(&request(ORIGIN), &cancel).await.unwrap();
    let b = engine.discover_safe_zones(&request(ORIGIN), &cancel).await.unwrap();
    let centers = |d: &super::ZoneDiscovery| d.zones.iter().map(|z| (z.center, z.occupancy)).collect::<Vec<_>>();
    assert_eq!(centers(&a), centers(&b));
}
