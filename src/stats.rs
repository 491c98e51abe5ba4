//! Dashboard summary statistics.

use serde::{Deserialize, Serialize};

use crate::{Circle, GeoPoint};

/// Operating state of a water-quality sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorStatus {
    Active,
    Inactive,
    Contaminated,
}

/// A deployed water-quality sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,
    pub position: GeoPoint,
    pub status: SensorStatus,
}

impl Sensor {
    pub fn new(id: &str, position: GeoPoint, status: SensorStatus) -> Self {
        Self {
            id: id.to_string(),
            position,
            status,
        }
    }
}

/// Headline numbers for the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStats {
    /// Sensors reporting (active or contaminated)
    pub active_sensors: u32,
    pub reported_cases: u32,
    pub contaminated_clusters: u32,
    /// Sum of risk-zone disc areas, overlaps counted twice
    pub total_risk_zone_area_km2: f64,
}

impl MapStats {
    /// Risk-zone area with two decimals, as shown on the dashboard.
    pub fn formatted_risk_area(&self) -> String {
        format!("{:.2}", self.total_risk_zone_area_km2)
    }
}

/// Compute dashboard statistics.
///
/// Any sensor that is not `Inactive` counts as active; a contaminated sensor
/// is still reporting.
pub fn compute_map_stats<C>(
    sensors: &[Sensor],
    cases: &[C],
    clusters: &[Circle],
    risk_zones: &[Circle],
) -> MapStats {
    let active_sensors = sensors
        .iter()
        .filter(|s| s.status != SensorStatus::Inactive)
        .count();

    MapStats {
        active_sensors: active_sensors as u32,
        reported_cases: cases.len() as u32,
        contaminated_clusters: clusters.len() as u32,
        total_risk_zone_area_km2: risk_zones.iter().map(Circle::area_km2).sum(),
    }
}
