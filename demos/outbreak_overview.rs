//! Walk through the outbreak map pipeline on a small Pune dataset.
//!
//! Run with: cargo run --example outbreak_overview

use outbreak_geo::{
    aggregate_cases, bounding_box_for_circles, classify_waterways, compute_map_stats,
    highlight_segments_near_zones, CaseReport, CaseType, Circle, GeoPoint, HighlightConfig,
    ProximityConfig, Sensor, SensorStatus, WaterFeature,
};

fn case(id: &str, case_type: CaseType, lat: f64, lng: f64) -> CaseReport {
    CaseReport::new(id, case_type, GeoPoint::new(lat, lng))
}

fn sensor(id: &str, lat: f64, lng: f64, status: SensorStatus) -> Sensor {
    Sensor::new(id, GeoPoint::new(lat, lng), status)
}

fn main() {
    let cases = vec![
        case("case-c1", CaseType::Confirmed, 18.5220, 73.8550),
        case("case-c2", CaseType::Confirmed, 18.5230, 73.8570),
        case("case-c3", CaseType::Confirmed, 18.5240, 73.8560),
        case("case-s1", CaseType::SelfReported, 18.5250, 73.8600),
        case("case-s2", CaseType::SelfReported, 18.5150, 73.8400),
    ];
    let sensors = vec![
        sensor("sensor-1", 18.520, 73.850, SensorStatus::Active),
        sensor("sensor-2", 18.525, 73.860, SensorStatus::Contaminated),
        sensor("sensor-3", 18.515, 73.840, SensorStatus::Inactive),
    ];

    let center = GeoPoint::new(18.523, 73.857);
    let clusters = [Circle::new(center, 700.0)];
    let risk_zones = [Circle::new(center, 2000.0)];

    println!("Outbreak Map Overview\n");

    println!("1. Case aggregation by zoom:");
    for zoom in [8, 11, 13, 15, 17] {
        let groups = aggregate_cases(&cases, zoom);
        println!("   zoom {:2}: {} markers", zoom, groups.len());
        for group in &groups {
            println!(
                "      {:<28} {:>2} case(s) radius {:>5.2}px",
                group.id,
                group.member_count(),
                group.marker_radius()
            );
        }
    }

    let bbox = bounding_box_for_circles(&risk_zones, 0.01);
    println!("\n2. Waterway query bounds: {}", bbox.to_overpass_bbox());

    // A synthetic north-south river through the outbreak area
    let path = (0..10)
        .map(|i| GeoPoint::new(18.50 + i as f64 * 0.01, 73.857))
        .collect();
    let features = vec![WaterFeature::line("way/501", path)];

    let config = ProximityConfig::default();
    let layers = classify_waterways(&features, &clusters, &risk_zones, &config);
    println!("\n3. Waterway layers:");
    for segment in &layers.contaminated {
        let vertices = segment.path.len();
        println!("   contaminated {} ({} vertices)", segment.id, vertices);
    }
    for segment in &layers.at_risk {
        let vertices = segment.path.len();
        println!("   at risk      {} ({} vertices)", segment.id, vertices);
    }

    let highlight = HighlightConfig::default();
    let legacy = highlight_segments_near_zones(&features, &risk_zones, &highlight);
    println!("   highlight windows: {} segment(s)", legacy.len());

    let stats = compute_map_stats(&sensors, &cases, &clusters, &risk_zones);
    println!("\n4. Dashboard:");
    println!("   Active sensors:        {}", stats.active_sensors);
    println!("   Reported cases:        {}", stats.reported_cases);
    println!("   Contaminated clusters: {}", stats.contaminated_clusters);
    let area = stats.formatted_risk_area();
    println!("   Risk zone area:        {} km²", area);
}
