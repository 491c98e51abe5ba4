//! # Waterway Proximity Segmentation
//!
//! Finds the parts of waterways that run through, or close to, circular zones.
//!
//! ## Algorithm
//! 1. Index zone envelopes (in degrees, generously padded) in an R-tree
//! 2. Polygons: keep the whole feature if any boundary vertex lies inside a zone
//! 3. Lines: a vertex pair qualifies when the segment passes within
//!    `radius + buffer` of some zone center (local planar distance)
//! 4. Coalesce consecutive qualifying pairs into one segment, sharing vertices
//!
//! The same routine serves both map layers: a zero buffer yields directly
//! contaminated water, a larger buffer yields water-adjacent risk.

use log::debug;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use crate::geo_utils::{
    haversine_distance, longitude_span_for_band, point_to_segment_distance,
    METERS_PER_DEGREE_LATITUDE,
};
use crate::{Circle, GeoPoint, Segment, WaterFeature};

/// Zone envelopes reach this many times further than the zone itself, so the
/// degree-space prefilter never drops a zone the planar check would accept
/// while segments stay short next to that margin.
const ENVELOPE_SAFETY_FACTOR: f64 = 2.0;

/// Buffers for the two waterway layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Buffer around contamination clusters (meters).
    /// Default: 0.0 (only water inside a cluster)
    pub contamination_buffer_meters: f64,

    /// Buffer around risk zones (meters).
    /// Default: 1000.0
    pub adjacency_buffer_meters: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            contamination_buffer_meters: 0.0,
            adjacency_buffer_meters: 1000.0,
        }
    }
}

/// Waterway segments split by layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterwayClassification {
    /// Water inside (or within the contamination buffer of) a cluster
    pub contaminated: Vec<Segment>,
    /// Water within the adjacency buffer of a risk zone
    pub at_risk: Vec<Segment>,
}

// =============================================================================
// R-tree Indexed Zones
// =============================================================================

/// A zone with its padded envelope in degree space.
#[derive(Debug, Clone, Copy)]
struct ZoneEnvelope {
    idx: usize,
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

/// Zones plus an R-tree over their envelopes.
struct ZoneIndex<'a> {
    zones: &'a [Circle],
    tree: RTree<ZoneEnvelope>,
}

impl<'a> ZoneIndex<'a> {
    fn new(zones: &'a [Circle], buffer_meters: f64) -> Self {
        let envelopes: Vec<ZoneEnvelope> = zones
            .iter()
            .enumerate()
            .map(|(idx, zone)| {
                let radius = zone.radius_meters.max(0.0) + buffer_meters.max(0.0);
                let reach = radius * ENVELOPE_SAFETY_FACTOR;
                let (lat, lng) = (zone.center.latitude, zone.center.longitude);

                let dlat = reach / METERS_PER_DEGREE_LATITUDE;
                let (min_lat, max_lat) = (lat - dlat, lat + dlat);

                // A band touching a pole spans every meridian
                let (min_lng, max_lng) = match longitude_span_for_band(reach, min_lat, max_lat) {
                    Some(dlng) => (lng - dlng, lng + dlng),
                    None => (-180.0, 180.0),
                };

                ZoneEnvelope {
                    idx,
                    min_lat,
                    max_lat,
                    min_lng,
                    max_lng,
                }
            })
            .collect();

        Self {
            zones,
            tree: RTree::bulk_load(envelopes),
        }
    }

    fn candidates(&self, a: &GeoPoint, b: &GeoPoint) -> impl Iterator<Item = &Circle> + '_ {
        let search = AABB::from_corners(
            [a.longitude.min(b.longitude), a.latitude.min(b.latitude)],
            [a.longitude.max(b.longitude), a.latitude.max(b.latitude)],
        );
        self.tree
            .locate_in_envelope_intersecting(&search)
            .map(move |env| &self.zones[env.idx])
    }

    /// Does segment `a → b` pass within `radius + buffer` of any zone?
    fn pair_is_near(&self, a: &GeoPoint, b: &GeoPoint, buffer_meters: f64) -> bool {
        self.candidates(a, b).any(|zone| {
            let reach = zone.radius_meters + buffer_meters;
            point_to_segment_distance(&zone.center, a, b).distance_meters <= reach
        })
    }

    /// Is `p` inside any zone (haversine, no buffer)?
    fn point_is_inside(&self, p: &GeoPoint) -> bool {
        self.candidates(p, p)
            .any(|zone| haversine_distance(&zone.center, p) <= zone.radius_meters)
    }
}

/// Whether any vertex of `path` lies inside any zone. Brute force.
pub(crate) fn polygon_touches_zones(path: &[GeoPoint], zones: &[Circle]) -> bool {
    path.iter().any(|p| {
        zones
            .iter()
            .any(|zone| haversine_distance(&zone.center, p) <= zone.radius_meters)
    })
}

// =============================================================================
// Segmentation
// =============================================================================

fn feature_segments(
    feature: &WaterFeature,
    index: &ZoneIndex<'_>,
    buffer_meters: f64,
) -> Vec<Segment> {
    if feature.is_polygon {
        if feature.path.iter().any(|p| index.point_is_inside(p)) {
            return vec![Segment::from_run(&feature.id, 0, &feature.path)];
        }
        return vec![];
    }

    let path = &feature.path;
    if path.len() < 2 {
        return vec![];
    }

    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, pair) in path.windows(2).enumerate() {
        let near = index.pair_is_near(&pair[0], &pair[1], buffer_meters);
        match (near, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                // Pairs start..i-1 cover vertices start..=i
                let run = &path[start..=i];
                segments.push(Segment::from_run(&feature.id, segments.len(), run));
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        let run = &path[start..];
        segments.push(Segment::from_run(&feature.id, segments.len(), run));
    }

    segments
}

/// Sub-segments of `features` that lie within `buffer_meters` of any zone.
///
/// Polygons are all-or-nothing and ignore the buffer: a polygon is returned
/// whole when any of its vertices is inside a zone. Lines are split into runs
/// of consecutive vertex pairs whose segment passes within
/// `zone.radius_meters + buffer_meters` of a zone center. Output paths are
/// always sub-runs of the input vertices.
///
/// Segment ids are `<feature id>-<k>` where `k` counts the feature's
/// segments from 0.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::{segments_near_zones, Circle, GeoPoint, WaterFeature};
///
/// let river = WaterFeature::line("way/42", (0..10)
///     .map(|i| GeoPoint::new(18.50 + i as f64 * 0.01, 73.857))
///     .collect());
/// let zone = Circle::new(GeoPoint::new(18.55, 73.857), 2000.0);
///
/// let segments = segments_near_zones(&[river], &[zone], 0.0);
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].id, "way/42-0");
/// ```
pub fn segments_near_zones(
    features: &[WaterFeature],
    zones: &[Circle],
    buffer_meters: f64,
) -> Vec<Segment> {
    if features.is_empty() || zones.is_empty() {
        return vec![];
    }

    let index = ZoneIndex::new(zones, buffer_meters);
    let segments: Vec<Segment> = features
        .iter()
        .flat_map(|feature| feature_segments(feature, &index, buffer_meters))
        .collect();

    debug!(
        "[Proximity] {} features x {} zones (buffer {}m) -> {} segments",
        features.len(),
        zones.len(),
        buffer_meters,
        segments.len()
    );

    segments
}

/// Same as [`segments_near_zones`], with features processed in parallel.
///
/// Output order matches the sequential version.
#[cfg(feature = "parallel")]
pub fn segments_near_zones_parallel(
    features: &[WaterFeature],
    zones: &[Circle],
    buffer_meters: f64,
) -> Vec<Segment> {
    use rayon::prelude::*;

    if features.is_empty() || zones.is_empty() {
        return vec![];
    }

    let index = ZoneIndex::new(zones, buffer_meters);
    let per_feature: Vec<Vec<Segment>> = features
        .par_iter()
        .map(|feature| feature_segments(feature, &index, buffer_meters))
        .collect();

    per_feature.into_iter().flatten().collect()
}

/// Run the segmenter for both map layers.
///
/// Clusters with the contamination buffer give the contaminated layer; risk
/// zones with the adjacency buffer give the at-risk layer.
pub fn classify_waterways(
    features: &[WaterFeature],
    clusters: &[Circle],
    risk_zones: &[Circle],
    config: &ProximityConfig,
) -> WaterwayClassification {
    WaterwayClassification {
        contaminated: segments_near_zones(features, clusters, config.contamination_buffer_meters),
        at_risk: segments_near_zones(features, risk_zones, config.adjacency_buffer_meters),
    }
}
