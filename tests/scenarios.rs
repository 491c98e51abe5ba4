//! End-to-end scenarios across aggregation, segmentation and fetch state.

use outbreak_geo::{
    aggregate_cases, bounding_box_for_circles, classify_waterways, compute_map_stats,
    highlight_segments_near_zones, parse_waterways, query_scope_for_circles, segments_near_zones,
    CaseReport, CaseType, Circle, GeoPoint, HighlightConfig, ProximityConfig, Sensor, SensorStatus,
    WaterFeature, WaterwayLoader, FALLBACK_BOUNDS,
};

fn river(id: &str) -> WaterFeature {
    let path = (0..10)
        .map(|i| GeoPoint::new(18.50 + i as f64 * 0.01, 73.857))
        .collect();
    WaterFeature::line(id, path)
}

fn case(id: &str, case_type: CaseType, lat: f64, lng: f64) -> CaseReport {
    CaseReport::new(id, case_type, GeoPoint::new(lat, lng))
}

fn sensor(id: &str, lat: f64, lng: f64, status: SensorStatus) -> Sensor {
    Sensor::new(id, GeoPoint::new(lat, lng), status)
}

fn pune_cases() -> Vec<CaseReport> {
    vec![
        case("case-c1", CaseType::Confirmed, 18.5220, 73.8550),
        case("case-c2", CaseType::Confirmed, 18.5230, 73.8570),
        case("case-c3", CaseType::Confirmed, 18.5240, 73.8560),
        case("case-s1", CaseType::SelfReported, 18.5250, 73.8600),
        case("case-s2", CaseType::SelfReported, 18.5150, 73.8400),
    ]
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_nearby_confirmed_cases_collapse_at_low_zoom() {
    let base = GeoPoint::new(18.5204, 73.8567);
    let offsets = [(0.0, 0.0), (0.0005, 0.0), (0.0, 0.0005), (0.0004, 0.0003)];
    let cases: Vec<CaseReport> = offsets
        .iter()
        .enumerate()
        .map(|(i, (dlat, dlng))| {
            CaseReport::new(
                &format!("case-{}", i),
                CaseType::Confirmed,
                GeoPoint::new(base.latitude + dlat, base.longitude + dlng),
            )
        })
        .collect();

    let groups = aggregate_cases(&cases, 8);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].member_count(), 4);

    let mean_lat = cases.iter().map(|c| c.position.latitude).sum::<f64>() / 4.0;
    let mean_lng = cases.iter().map(|c| c.position.longitude).sum::<f64>() / 4.0;
    assert!((groups[0].center.latitude - mean_lat).abs() < 1e-9);
    assert!((groups[0].center.longitude - mean_lng).abs() < 1e-9);
}

#[test]
fn test_zoom_levels_refine_grouping() {
    let cases = pune_cases();

    // Street level: every case on its own
    let street = aggregate_cases(&cases, 17);
    assert_eq!(street.len(), cases.len());
    assert!(street.iter().all(|g| g.is_singleton()));

    // Region level: one group per type
    let region = aggregate_cases(&cases, 9);
    assert_eq!(region.len(), 2);
    assert_eq!(region[0].case_type, CaseType::Confirmed);
    assert_eq!(region[0].member_count(), 3);
    assert_eq!(region[1].member_count(), 2);

    let city = aggregate_cases(&cases, 12);
    let total: usize = city.iter().map(|g| g.member_count()).sum();
    assert_eq!(total, cases.len());
}

#[test]
fn test_aggregation_is_deterministic() {
    let cases = pune_cases();
    for zoom in [3, 10, 12, 14, 16] {
        assert_eq!(aggregate_cases(&cases, zoom), aggregate_cases(&cases, zoom));
    }
}

// =============================================================================
// Waterway Segmentation
// =============================================================================

#[test]
fn test_risk_zone_on_river_selects_central_run() {
    let feature = river("way/42");
    let zone = Circle::new(feature.path[5], 2000.0);

    let segments = segments_near_zones(&[feature.clone()], &[zone], 0.0);
    assert_eq!(segments.len(), 1);

    let path = &segments[0].path;
    assert!(path.contains(&feature.path[5]));
    for far in [0, 1, 9] {
        let excluded = !path.contains(&feature.path[far]);
        assert!(excluded, "vertex {} should be excluded", far);
    }
    // Output is a contiguous run of input vertices
    let start = feature.path.iter().position(|p| p == &path[0]).unwrap();
    assert_eq!(path.as_slice(), &feature.path[start..start + path.len()]);
}

#[test]
fn test_segmentation_is_deterministic() {
    let features = vec![river("way/1"), river("way/2")];
    let zones = [
        Circle::new(GeoPoint::new(18.55, 73.857), 2000.0),
        Circle::new(GeoPoint::new(18.52, 73.86), 700.0),
    ];
    assert_eq!(
        segments_near_zones(&features, &zones, 1000.0),
        segments_near_zones(&features, &zones, 1000.0)
    );
}

#[test]
fn test_highlight_is_at_least_as_wide_as_segmenter() {
    let feature = river("way/7");
    let zone = Circle::new(feature.path[5], 2000.0);

    let canonical = segments_near_zones(&[feature.clone()], &[zone], 0.0);
    let config = HighlightConfig::default();
    let legacy = highlight_segments_near_zones(&[feature], &[zone], &config);

    assert_eq!(legacy.len(), 1);
    assert!(legacy[0].path.len() >= canonical[0].path.len());
    assert!(canonical[0].path.iter().all(|p| legacy[0].path.contains(p)));
}

// =============================================================================
// Full Pipeline
// =============================================================================

const OVERPASS_BODY: &str = r#"{
    "elements": [
        {
            "type": "way", "id": 501, "tags": {"waterway": "river", "name": "Mutha"},
            "geometry": [
                {"lat": 18.500, "lon": 73.857},
                {"lat": 18.510, "lon": 73.857},
                {"lat": 18.520, "lon": 73.857},
                {"lat": 18.530, "lon": 73.857},
                {"lat": 18.540, "lon": 73.857},
                {"lat": 18.550, "lon": 73.857}
            ]
        },
        {
            "type": "way", "id": 502, "tags": {"natural": "water", "name": "Pashan Lake"},
            "geometry": [
                {"lat": 18.530, "lon": 73.780},
                {"lat": 18.540, "lon": 73.780},
                {"lat": 18.540, "lon": 73.790},
                {"lat": 18.530, "lon": 73.780}
            ]
        }
    ]
}"#;

#[test]
fn test_zones_to_classified_waterways() {
    let center = GeoPoint::new(18.523, 73.857);
    let clusters = [Circle::new(center, 700.0)];
    let risk_zones = [Circle::new(center, 2000.0)];

    let scope = query_scope_for_circles(&risk_zones, 0.01).unwrap();
    assert_ne!(scope, FALLBACK_BOUNDS);
    assert!(scope.contains(&center));

    let mut loader = WaterwayLoader::new();
    let ticket = loader.request(scope).unwrap();
    assert!(loader.features().is_none());
    assert!(loader.complete(ticket, parse_waterways(OVERPASS_BODY)));

    let features = loader.features().unwrap();
    assert_eq!(features.len(), 2);

    let config = ProximityConfig::default();
    let layers = classify_waterways(features, &clusters, &risk_zones, &config);
    assert_eq!(layers.contaminated.len(), 1);
    assert_eq!(layers.contaminated[0].id, "way/501-0");
    assert_eq!(layers.at_risk.len(), 1);
    let risk_len = layers.at_risk[0].path.len();
    assert!(risk_len >= layers.contaminated[0].path.len());
    // The lake is ~7 km west of the zones
    assert!(layers.at_risk.iter().all(|s| !s.id.starts_with("way/502")));
}

#[test]
fn test_failed_fetch_yields_empty_layers() {
    let risk_zones = [Circle::new(GeoPoint::new(18.523, 73.857), 2000.0)];
    let scope = bounding_box_for_circles(&risk_zones, 0.01);

    let mut loader = WaterwayLoader::new();
    let ticket = loader.request(scope).unwrap();
    let rate_limited = parse_waterways("<html>Too Many Requests</html>");
    assert!(loader.complete(ticket, rate_limited));

    let features = loader.features().unwrap();
    let config = ProximityConfig::default();
    let layers = classify_waterways(features, &[], &risk_zones, &config);
    assert!(layers.contaminated.is_empty());
    assert!(layers.at_risk.is_empty());
}

#[test]
fn test_dashboard_stats() {
    let sensors = vec![
        sensor("sensor-1", 18.52, 73.85, SensorStatus::Active),
        sensor("sensor-2", 18.525, 73.86, SensorStatus::Contaminated),
        sensor("sensor-3", 18.515, 73.84, SensorStatus::Inactive),
        sensor("sensor-4", 18.53, 73.87, SensorStatus::Active),
    ];
    let center = GeoPoint::new(18.523, 73.857);

    let stats = compute_map_stats(
        &sensors,
        &pune_cases(),
        &[Circle::new(center, 700.0)],
        &[Circle::new(center, 2000.0)],
    );
    assert_eq!(stats.active_sensors, 3);
    assert_eq!(stats.reported_cases, 5);
    assert_eq!(stats.contaminated_clusters, 1);
    assert_eq!(stats.formatted_risk_area(), "12.57");
}
