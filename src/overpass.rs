//! Overpass API query building and response parsing.
//!
//! The query asks for linear waterways and water bodies inside a bounding box
//! with inline geometry (`out geom`), so no node lookups are needed. Parsing
//! is lenient per feature: anything without usable geometry is skipped and
//! the rest of the batch is kept.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bounds::BoundingBox;
use crate::error::Result;
use crate::{GeoPoint, WaterFeature};

/// Public Overpass endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Linear waterway kinds worth testing against zones.
const LINEAR_WATERWAYS: &str = "river|stream|canal|drain|ditch";

/// Configuration for the waterway query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Interpreter endpoint.
    /// Default: [`DEFAULT_OVERPASS_URL`]
    pub endpoint: String,

    /// Server-side query timeout, also used as the HTTP timeout (seconds).
    /// Default: 25
    pub timeout_secs: u64,

    /// Extra attempts after a retryable failure.
    /// Default: 2
    pub max_retries: u32,

    /// Base delay between attempts, multiplied by the attempt number (ms).
    /// Default: 500
    pub retry_backoff_ms: u64,

    /// Padding added around the zone bounding box (degrees).
    /// Default: 0.01 (~1.1 km)
    pub padding_degrees: f64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_string(),
            timeout_secs: 25,
            max_retries: 2,
            retry_backoff_ms: 500,
            padding_degrees: 0.01,
        }
    }
}

/// Overpass QL for waterways and water bodies inside `bbox`.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::{build_waterway_query, BoundingBox};
///
/// let bbox = BoundingBox { south: 18.45, west: 73.75, north: 18.60, east: 73.95 };
/// let query = build_waterway_query(&bbox, 25);
/// assert!(query.starts_with("[out:json][timeout:25];"));
/// assert!(query.contains("(18.45,73.75,18.6,73.95)"));
/// ```
pub fn build_waterway_query(bbox: &BoundingBox, timeout_secs: u64) -> String {
    let b = bbox.to_overpass_bbox();
    format!(
        "[out:json][timeout:{timeout_secs}];\n(\n  way[\"waterway\"~\"^({LINEAR_WATERWAYS})$\"]({b});\n  way[\"natural\"=\"water\"]({b});\n  relation[\"natural\"=\"water\"]({b});\n);\nout geom;"
    )
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    #[serde(default)]
    tags: HashMap<String, String>,
    /// Missing nodes show up as `null` entries
    #[serde(default)]
    geometry: Option<Vec<Option<OverpassGeometryPoint>>>,
    #[serde(default)]
    members: Vec<OverpassMember>,
}

#[derive(Debug, Deserialize)]
struct OverpassMember {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    geometry: Option<Vec<Option<OverpassGeometryPoint>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct OverpassGeometryPoint {
    lat: f64,
    lon: f64,
}

// =============================================================================
// Parsing
// =============================================================================

/// Tags that make a closed way an area rather than a line.
fn has_area_tags(tags: &HashMap<String, String>) -> bool {
    tags.get("natural").is_some_and(|v| v == "water")
        || tags.contains_key("water")
        || tags.get("waterway").is_some_and(|v| v == "riverbank")
        || tags.get("landuse").is_some_and(|v| v == "reservoir")
}

/// Valid vertices of an Overpass geometry list, or `None` if fewer than two.
fn geometry_path(geometry: Option<&Vec<Option<OverpassGeometryPoint>>>) -> Option<Vec<GeoPoint>> {
    let path: Vec<GeoPoint> = geometry?
        .iter()
        .flatten()
        .map(|g| GeoPoint::new(g.lat, g.lon))
        .filter(|p| p.is_valid())
        .collect();

    if path.len() < 2 {
        return None;
    }
    Some(path)
}

/// A ring needs at least a triangle plus the repeated first vertex.
fn is_closed_ring(path: &[GeoPoint]) -> bool {
    path.len() >= 4 && path.first() == path.last()
}

fn element_features(element: &OverpassElement) -> Vec<WaterFeature> {
    let name = element.tags.get("name").cloned();

    match element.kind.as_str() {
        "way" => {
            let Some(path) = geometry_path(element.geometry.as_ref()) else {
                debug!("[Overpass] Skipping way/{}: no usable geometry", element.id);
                return vec![];
            };
            // An area tag on an open way is a mapping error; treat it as a line
            let is_polygon = has_area_tags(&element.tags) && is_closed_ring(&path);
            vec![WaterFeature {
                id: format!("way/{}", element.id),
                name,
                path,
                is_polygon,
            }]
        }
        "relation" => element
            .members
            .iter()
            .filter(|m| m.kind == "way")
            .filter_map(|m| geometry_path(m.geometry.as_ref()))
            .enumerate()
            .map(|(k, path)| WaterFeature {
                id: format!("relation/{}/{}", element.id, k),
                name: name.clone(),
                path,
                is_polygon: true,
            })
            .collect(),
        other => {
            debug!(
                "[Overpass] Skipping {}/{}: unsupported element type",
                other, element.id
            );
            vec![]
        }
    }
}

/// Parse an Overpass JSON document into water features.
///
/// Ways become one feature each (`way/<id>`); each member way of a water
/// relation becomes a polygon feature (`relation/<id>/<k>`). Elements without
/// geometry or with fewer than two valid vertices are skipped. Only a
/// document that is not valid Overpass JSON is an error.
pub fn parse_waterways(body: &str) -> Result<Vec<WaterFeature>> {
    let response: OverpassResponse = serde_json::from_str(body)?;
    let total = response.elements.len();

    let features: Vec<WaterFeature> = response
        .elements
        .iter()
        .flat_map(element_features)
        .collect();

    debug!(
        "[Overpass] Parsed {} elements -> {} features",
        total,
        features.len()
    );
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            {
                "type": "way", "id": 1001,
                "tags": {"waterway": "river", "name": "Mula-Mutha"},
                "geometry": [
                    {"lat": 18.510, "lon": 73.840},
                    {"lat": 18.520, "lon": 73.850},
                    null,
                    {"lat": 18.530, "lon": 73.860}
                ]
            },
            {
                "type": "way", "id": 1002,
                "tags": {"natural": "water"},
                "geometry": [
                    {"lat": 18.52, "lon": 73.85},
                    {"lat": 18.52, "lon": 73.86},
                    {"lat": 18.53, "lon": 73.86},
                    {"lat": 18.52, "lon": 73.85}
                ]
            },
            {"type": "way", "id": 1003, "tags": {"waterway": "stream"}},
            {
                "type": "way", "id": 1004,
                "tags": {"waterway": "drain"},
                "geometry": [{"lat": 18.5, "lon": 73.8}]
            },
            {
                "type": "relation", "id": 2001,
                "tags": {"natural": "water", "name": "Pashan Lake"},
                "members": [
                    {"type": "way", "role": "outer", "geometry": [
                        {"lat": 18.53, "lon": 73.78},
                        {"lat": 18.54, "lon": 73.79},
                        {"lat": 18.53, "lon": 73.79}
                    ]},
                    {"type": "node", "role": "label"},
                    {"type": "way", "role": "inner"}
                ]
            },
            {"type": "node", "id": 3001, "lat": 18.5, "lon": 73.8}
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let features = parse_waterways(SAMPLE).unwrap();
        let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["way/1001", "way/1002", "relation/2001/0"]);
    }

    #[test]
    fn test_null_geometry_entries_dropped() {
        let features = parse_waterways(SAMPLE).unwrap();
        let river = &features[0];
        assert_eq!(river.path.len(), 3);
        assert!(!river.is_polygon);
        assert_eq!(river.name.as_deref(), Some("Mula-Mutha"));
    }

    #[test]
    fn test_closed_water_way_is_polygon() {
        let features = parse_waterways(SAMPLE).unwrap();
        assert!(features[1].is_polygon);
        assert!(features[2].is_polygon);
        assert_eq!(features[2].name.as_deref(), Some("Pashan Lake"));
    }

    #[test]
    fn test_open_water_way_is_line() {
        let body = r#"{"elements": [{
            "type": "way", "id": 5, "tags": {"natural": "water"},
            "geometry": [{"lat": 18.52, "lon": 73.85}, {"lat": 18.53, "lon": 73.86}]
        }]}"#;
        let features = parse_waterways(body).unwrap();
        assert_eq!(features.len(), 1);
        assert!(!features[0].is_polygon);
    }

    #[test]
    fn test_ring_needs_four_vertices() {
        let a = GeoPoint::new(18.52, 73.85);
        let b = GeoPoint::new(18.53, 73.86);
        let c = GeoPoint::new(18.52, 73.86);

        assert!(is_closed_ring(&[a, b, c, a]));
        assert!(!is_closed_ring(&[a, b, a]));
        assert!(!is_closed_ring(&[a, b, c, b]));
        assert!(!is_closed_ring(&[]));
    }

    #[test]
    fn test_empty_and_malformed_documents() {
        assert!(parse_waterways(r#"{"elements": []}"#).unwrap().is_empty());
        assert!(parse_waterways("{}").unwrap().is_empty());
        assert!(parse_waterways("<html>rate limited</html>").is_err());
    }

    #[test]
    fn test_query_mentions_every_feature_class() {
        let bbox = BoundingBox {
            south: 18.4,
            west: 73.7,
            north: 18.6,
            east: 73.9,
        };
        let query = build_waterway_query(&bbox, 60);
        let linear = r#"way["waterway"~"^(river|stream|canal|drain|ditch)$"]"#;
        let scope = "(18.4,73.7,18.6,73.9);";
        assert!(query.contains("[timeout:60]"));
        assert!(query.contains(&format!("{linear}{scope}")));
        let bodies = r#"relation["natural"="water"]"#;
        assert!(query.contains(&format!("{bodies}{scope}")));
        assert!(query.ends_with("out geom;"));
    }
}
