//! Fetch real waterways around a risk zone from Overpass and classify them.
//!
//! Run with: cargo run --example waterway_fetch --features http

use outbreak_geo::{
    classify_waterways, query_scope_for_circles, Circle, GeoPoint, OverpassConfig, OverpassFetcher,
    ProximityConfig, WaterwayLoader, WaterwayState,
};

#[tokio::main]
async fn main() -> outbreak_geo::Result<()> {
    let center = GeoPoint::new(18.523, 73.857);
    let clusters = [Circle::new(center, 700.0)];
    let risk_zones = [Circle::new(center, 2000.0)];

    let fetcher = OverpassFetcher::new(OverpassConfig::default())?;
    let mut loader = WaterwayLoader::new();

    let Some(scope) = query_scope_for_circles(&risk_zones, fetcher.config().padding_degrees) else {
        println!("No risk zones, nothing to fetch");
        return Ok(());
    };

    println!("Fetching waterways in {}", scope.to_overpass_bbox());
    fetcher.refresh(&mut loader, scope).await;

    if let WaterwayState::Failed { reason, .. } = loader.state() {
        println!("Fetch failed ({}), showing no water", reason);
    }

    let features = loader.features().unwrap_or_default();
    println!("{} water features", features.len());

    let config = ProximityConfig::default();
    let layers = classify_waterways(features, &clusters, &risk_zones, &config);
    println!("Contaminated segments: {}", layers.contaminated.len());
    println!("At-risk segments:      {}", layers.at_risk.len());
    for segment in layers.at_risk.iter().take(10) {
        println!("   {} ({} vertices)", segment.id, segment.path.len());
    }

    Ok(())
}
