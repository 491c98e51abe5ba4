//! Bounding boxes around zones, used to scope the waterway query.

use serde::{Deserialize, Serialize};

use crate::geo_utils::{meters_per_degree_longitude, METERS_PER_DEGREE_LATITUDE};
use crate::{Circle, GeoPoint};

/// A latitude/longitude box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Default viewport (central Pune) returned when there is nothing to enclose.
///
/// Callers must read this as "no query scope available", not as a real area
/// of interest.
pub const FALLBACK_BOUNDS: BoundingBox = BoundingBox {
    south: 18.45,
    west: 73.75,
    north: 18.60,
    east: 73.95,
};

impl BoundingBox {
    /// Grow the box by `degrees` on every side.
    pub fn padded(&self, degrees: f64) -> Self {
        Self {
            south: self.south - degrees,
            west: self.west - degrees,
            north: self.north + degrees,
            east: self.east + degrees,
        }
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.latitude >= self.south
            && p.latitude <= self.north
            && p.longitude >= self.west
            && p.longitude <= self.east
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Limit the box to valid coordinates: latitude within ±90 and longitude
    /// within ±180.
    pub fn clamped(&self) -> Self {
        Self {
            south: self.south.clamp(-90.0, 90.0),
            west: self.west.clamp(-180.0, 180.0),
            north: self.north.clamp(-90.0, 90.0),
            east: self.east.clamp(-180.0, 180.0),
        }
    }

    /// `south,west,north,east`, the order Overpass expects.
    pub fn to_overpass_bbox(&self) -> String {
        [self.south, self.west, self.north, self.east]
            .map(|v| v.to_string())
            .join(",")
    }
}

/// Box enclosing every circle, padded by `padding_degrees`.
///
/// Each radius is converted to a latitude delta (fixed meters per degree) and
/// a longitude delta (meters per degree at the circle's latitude). The padded
/// box is clamped to valid coordinates, so circles near a pole span every
/// longitude instead of producing an unbounded box. An empty slice returns
/// [`FALLBACK_BOUNDS`] without padding.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::{bounding_box_for_circles, Circle, GeoPoint, FALLBACK_BOUNDS};
///
/// assert_eq!(bounding_box_for_circles(&[], 0.01), FALLBACK_BOUNDS);
///
/// let zone = Circle::new(GeoPoint::new(18.523, 73.857), 2000.0);
/// let bbox = bounding_box_for_circles(&[zone], 0.0);
/// assert!(bbox.north - zone.center.latitude > 0.017);
/// ```
pub fn bounding_box_for_circles(circles: &[Circle], padding_degrees: f64) -> BoundingBox {
    if circles.is_empty() {
        return FALLBACK_BOUNDS;
    }

    let mut south = f64::INFINITY;
    let mut west = f64::INFINITY;
    let mut north = f64::NEG_INFINITY;
    let mut east = f64::NEG_INFINITY;

    for circle in circles {
        let lat_delta = circle.radius_meters / METERS_PER_DEGREE_LATITUDE;
        let lng_delta = circle.radius_meters / meters_per_degree_longitude(circle.center.latitude);

        south = south.min(circle.center.latitude - lat_delta);
        north = north.max(circle.center.latitude + lat_delta);
        west = west.min(circle.center.longitude - lng_delta);
        east = east.max(circle.center.longitude + lng_delta);
    }

    let enclosing = BoundingBox {
        south,
        west,
        north,
        east,
    };
    enclosing.padded(padding_degrees).clamped()
}

/// Query scope for `circles`, or `None` when there are no circles.
pub fn query_scope_for_circles(circles: &[Circle], padding_degrees: f64) -> Option<BoundingBox> {
    if circles.is_empty() {
        return None;
    }
    Some(bounding_box_for_circles(circles, padding_degrees))
}
