//! # Outbreak Geo
//!
//! Spatial aggregation and waterway proximity engine for outbreak map dashboards.
//!
//! This library provides:
//! - Zoom-adaptive aggregation of case reports into map groups
//! - Great-circle and point-to-segment distance on the Earth's surface
//! - Waterway segments inside or near contamination clusters and risk zones
//! - Padded query bounds for fetching waterway geometry from Overpass
//! - Dashboard statistics for sensors, cases and risk zones
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel waterway segmentation with rayon
//! - **`http`** - Enable the async Overpass client for waterway fetching
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use outbreak_geo::{aggregate_cases, segments_near_zones, CaseReport, CaseType, Circle, GeoPoint, WaterFeature};
//!
//! let cases = vec![
//!     CaseReport::new("case-c1", CaseType::Confirmed, GeoPoint::new(18.522, 73.858)),
//!     CaseReport::new("case-c2", CaseType::Confirmed, GeoPoint::new(18.523, 73.857)),
//! ];
//!
//! // At city zoom both reports collapse into one group
//! let groups = aggregate_cases(&cases, 12);
//! assert_eq!(groups.len(), 1);
//!
//! let river = WaterFeature::line("way/1", vec![
//!     GeoPoint::new(18.50, 73.857),
//!     GeoPoint::new(18.523, 73.857),
//!     GeoPoint::new(18.55, 73.857),
//! ]);
//! let cluster = Circle::new(GeoPoint::new(18.523, 73.857), 700.0);
//!
//! let contaminated = segments_near_zones(&[river], &[cluster], 0.0);
//! assert_eq!(contaminated.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// Unified error handling
pub mod error;
pub use error::{OutbreakMapError, Result};

// Geographic utilities (distance, projection, arc length)
pub mod geo_utils;

// Zoom-adaptive case aggregation
pub mod aggregation;
pub use aggregation::{
    aggregate_cases, marker_radius, precision_for_zoom, AggregatedGroup, SINGLETON_MARKER_RADIUS,
};

// Waterway proximity segmentation (canonical strategy)
pub mod proximity;
#[cfg(feature = "parallel")]
pub use proximity::segments_near_zones_parallel;
pub use proximity::{
    classify_waterways, segments_near_zones, ProximityConfig, WaterwayClassification,
};

// Arc-length highlight windows (legacy strategy)
pub mod highlight;
pub use highlight::{highlight_segments_near_zones, HighlightConfig, HighlightWindow};

// Query bounds around circles
pub mod bounds;
pub use bounds::{bounding_box_for_circles, query_scope_for_circles, BoundingBox, FALLBACK_BOUNDS};

// Overpass query building and response parsing
pub mod overpass;
pub use overpass::{build_waterway_query, parse_waterways, OverpassConfig};

// Waterway fetch state machine
pub mod waterways;
pub use waterways::{FetchTicket, WaterwayLoader, WaterwayState};

// Dashboard statistics
pub mod stats;
pub use stats::{compute_map_stats, MapStats, Sensor, SensorStatus};

// HTTP client for Overpass waterway fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::OverpassFetcher;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use outbreak_geo::GeoPoint;
/// let point = GeoPoint::new(18.5204, 73.8567); // Pune
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// `[lat, lng]` pairs, as map libraries hand them around.
impl From<[f64; 2]> for GeoPoint {
    fn from(latlng: [f64; 2]) -> Self {
        Self::new(latlng[0], latlng[1])
    }
}

/// A circular zone: a contamination cluster or a risk zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

impl Circle {
    pub fn new(center: GeoPoint, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    /// Area in square kilometres.
    pub fn area_km2(&self) -> f64 {
        std::f64::consts::PI * self.radius_meters * self.radius_meters / 1_000_000.0
    }
}

/// How a case entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseType {
    Confirmed,
    #[serde(rename = "Self-Reported")]
    SelfReported,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Confirmed => "Confirmed",
            CaseType::SelfReported => "Self-Reported",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can be aggregated on the map.
///
/// Aggregation only reads the id, the type and the position; every other
/// field of the implementor travels along untouched inside the group.
pub trait CaseLike {
    fn id(&self) -> &str;
    fn case_type(&self) -> CaseType;
    fn position(&self) -> GeoPoint;
}

/// A single case report with its patient payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub id: String,
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub position: GeoPoint,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub disease: Option<String>,
}

impl CaseReport {
    /// Create a report with an empty payload.
    pub fn new(id: &str, case_type: CaseType, position: GeoPoint) -> Self {
        Self {
            id: id.to_string(),
            case_type,
            position,
            name: String::new(),
            age: None,
            gender: None,
            symptoms: Vec::new(),
            disease: None,
        }
    }
}

impl CaseLike for CaseReport {
    fn id(&self) -> &str {
        &self.id
    }

    fn case_type(&self) -> CaseType {
        self.case_type
    }

    fn position(&self) -> GeoPoint {
        self.position
    }
}

/// A waterway or water body to test against zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterFeature {
    /// Unique identifier (e.g. `way/123`)
    pub id: String,
    /// Display name from OSM tags, if any
    pub name: Option<String>,
    /// Ordered vertices of the line or polygon boundary
    pub path: Vec<GeoPoint>,
    /// Treat the path as a closed polygon boundary
    pub is_polygon: bool,
}

impl WaterFeature {
    /// A linear feature such as a river or canal.
    pub fn line(id: &str, path: Vec<GeoPoint>) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            path,
            is_polygon: false,
        }
    }

    /// A water body whose path is its boundary ring.
    pub fn polygon(id: &str, path: Vec<GeoPoint>) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            path,
            is_polygon: true,
        }
    }
}

/// A contiguous run of an input feature's vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// `<feature id>-<occurrence index>`
    pub id: String,
    pub path: Vec<GeoPoint>,
}

impl Segment {
    pub(crate) fn from_run(feature_id: &str, occurrence: usize, path: &[GeoPoint]) -> Self {
        Self {
            id: format!("{}-{}", feature_id, occurrence),
            path: path.to_vec(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
