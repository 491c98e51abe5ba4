//! # Geographic Utilities
//!
//! Core geographic computation utilities for map overlays.
//!
//! Every other module in the crate measures distance through these functions,
//! so the constants here define the crate's notion of a metre.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`meters_per_degree_longitude`] | Length of one degree of longitude at a latitude |
//! | [`point_to_segment_distance`] | Distance from a point to a short segment (local planar) |
//! | [`cumulative_arc_length`] | Running distance along a polyline |
//! | [`polyline_length`] | Total length of a polyline in meters |
//! | [`longitude_span_for_band`] | Degrees of longitude covering a distance across a latitude band |
//!
//! ## Example
//!
//! ```rust
//! use outbreak_geo::{GeoPoint, geo_utils};
//!
//! let river = vec![
//!     GeoPoint::new(18.5200, 73.8500),
//!     GeoPoint::new(18.5250, 73.8550),
//!     GeoPoint::new(18.5300, 73.8600),
//! ];
//!
//! let length = geo_utils::polyline_length(&river);
//! println!("River length: {:.0}m", length);
//!
//! let well = GeoPoint::new(18.5260, 73.8540);
//! let proj = geo_utils::point_to_segment_distance(&well, &river[0], &river[1]);
//! println!("Well is {:.0}m from the first reach", proj.distance_meters);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Great-circle distance on a sphere of radius 6,371 km. Accurate to within
//! 0.3% for practical map distances.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)
//!
//! ### Local Planar Projection
//!
//! Point-to-segment distance scales degrees to meters with a fixed
//! 111,320 m per degree of latitude and `111,320 * cos(lat)` per degree of
//! longitude, evaluated at the segment's midpoint latitude. This is only
//! valid for segments of a few tens of kilometres at most.

use geo::{Coord, Distance, Euclidean, Line, LineLocatePoint, Point};
use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// Mean Earth radius used by [`haversine_distance`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Length of one degree of latitude, independent of latitude.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;

/// Below this `cos(latitude)` a degree of longitude is treated as zero length.
const MIN_LONGITUDE_SCALE_COS: f64 = 1e-6;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (assuming a spherical Earth
/// with radius 6,371 km). Symmetric, and zero for identical points.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::{GeoPoint, geo_utils};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Length in meters of one degree of longitude at `latitude` (degrees).
///
/// Shrinks with `cos(latitude)` and reaches zero at the poles.
#[inline]
pub fn meters_per_degree_longitude(latitude: f64) -> f64 {
    METERS_PER_DEGREE_LATITUDE * latitude.to_radians().cos()
}

/// Result of projecting a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentProjection {
    /// Distance from the point to the closest point on the segment
    pub distance_meters: f64,
    /// Position of the closest point along `a → b`, clamped to `[0, 1]`
    pub fraction_along_segment: f64,
    /// Planar length of the segment
    pub segment_length_meters: f64,
}

/// Distance from `p` to the segment `a → b`.
///
/// All three points are projected into a local metric plane anchored at `a`,
/// with the longitude scale taken at the segment's midpoint latitude. The
/// distance and the clamped fraction along the segment are then measured on
/// that plane, so points beyond either end measure to that endpoint.
///
/// A zero-length segment returns the haversine distance to `a` with a
/// fraction of 0.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::{GeoPoint, geo_utils};
///
/// let a = GeoPoint::new(0.0, 0.0);
/// let b = GeoPoint::new(0.0, 0.01);
/// let on_segment = GeoPoint::new(0.0, 0.0025);
///
/// let proj = geo_utils::point_to_segment_distance(&on_segment, &a, &b);
/// assert!(proj.distance_meters < 1e-6);
/// assert!((proj.fraction_along_segment - 0.25).abs() < 1e-9);
/// ```
pub fn point_to_segment_distance(p: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> SegmentProjection {
    if a == b {
        return degenerate_projection(p, a);
    }

    let mid_lat = (a.latitude + b.latitude) / 2.0;
    let to_local = |q: &GeoPoint| Coord {
        x: (q.longitude - a.longitude) * meters_per_degree_longitude(mid_lat),
        y: (q.latitude - a.latitude) * METERS_PER_DEGREE_LATITUDE,
    };

    let segment = Line::new(to_local(a), to_local(b));
    let point = Point::from(to_local(p));

    let segment_length_meters = Euclidean::distance(segment.start, segment.end);
    // Distinct endpoints can still collapse at the poles
    if segment_length_meters == 0.0 {
        return degenerate_projection(p, a);
    }

    SegmentProjection {
        distance_meters: Euclidean::distance(&point, &segment),
        fraction_along_segment: segment.line_locate_point(&point).unwrap_or(0.0),
        segment_length_meters,
    }
}

fn degenerate_projection(p: &GeoPoint, a: &GeoPoint) -> SegmentProjection {
    SegmentProjection {
        distance_meters: haversine_distance(p, a),
        fraction_along_segment: 0.0,
        segment_length_meters: 0.0,
    }
}

// =============================================================================
// Polyline Functions
// =============================================================================

/// Running haversine distance from the first vertex to each vertex.
///
/// The result has one entry per vertex; the first is always 0. Empty input
/// returns an empty vector.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::{GeoPoint, geo_utils};
///
/// let path = vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.0, 0.001),
///     GeoPoint::new(0.0, 0.002),
/// ];
/// let cumulative = geo_utils::cumulative_arc_length(&path);
/// assert_eq!(cumulative.len(), 3);
/// assert_eq!(cumulative[0], 0.0);
/// assert!(cumulative[2] > cumulative[1]);
/// ```
pub fn cumulative_arc_length(points: &[GeoPoint]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += haversine_distance(&points[i - 1], point);
        }
        cumulative.push(total);
    }

    cumulative
}

/// Calculate the total length of a polyline in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// polylines return 0.0.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Longitude half-width (degrees) that spans `meters` anywhere in the
/// latitude band `[south, north]`.
///
/// Uses the narrowest degree of longitude in the band, so the result is an
/// upper bound for every latitude in it. Returns `None` when the band reaches
/// (or nearly reaches) a pole and no finite width is enough.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::geo_utils;
///
/// let equator = geo_utils::longitude_span_for_band(111_320.0, -0.5, 0.5).unwrap();
/// assert!(equator >= 1.0);
/// assert!(geo_utils::longitude_span_for_band(1000.0, 89.0, 90.0).is_none());
/// ```
pub fn longitude_span_for_band(meters: f64, south: f64, north: f64) -> Option<f64> {
    let poleward = south.abs().max(north.abs()).min(90.0);
    let cos = poleward.to_radians().cos();
    if cos <= MIN_LONGITUDE_SCALE_COS {
        return None;
    }
    Some(meters / (METERS_PER_DEGREE_LATITUDE * cos))
}

// =============================================================================
// Unit Tests
// =============================================================================
