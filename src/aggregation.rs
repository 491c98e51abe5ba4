//! Zoom-adaptive aggregation of case reports.
//!
//! Cases are bucketed by type and by their coordinates rounded to a number of
//! decimal places that grows with the zoom level. This is O(n) and fully
//! reproducible: the same cases at the same zoom always produce the same
//! group ids, so map popups don't jump between renders.
//!
//! | zoom ≥ | decimals | bucket size (approx.) |
//! |--------|----------|-----------------------|
//! | 16 | 4 | no clustering, one group per case |
//! | 14 | 3 | ~110 m |
//! | 12 | 2 | ~1.1 km |
//! | 10 | 1 | ~11 km |
//! | else | 0 | ~110 km |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CaseLike, CaseReport, CaseType, GeoPoint};

/// Zoom thresholds and rounding precision, first match wins.
const ZOOM_PRECISION: [(i32, u32); 4] = [(16, 4), (14, 3), (12, 2), (10, 1)];

/// At this precision every case is its own group.
const NO_CLUSTERING_PRECISION: u32 = 4;

/// Marker radius (pixels) for a single case.
pub const SINGLETON_MARKER_RADIUS: f64 = 6.0;

/// Upper bound on a group's marker radius (pixels).
const MAX_MARKER_RADIUS: f64 = 20.0;

/// A set of cases drawn as one marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedGroup<C = CaseReport> {
    /// Case id for singletons, bucket key otherwise
    pub id: String,
    pub case_type: CaseType,
    /// Running mean of member positions
    pub center: GeoPoint,
    /// Members in insertion order (never empty)
    pub members: Vec<C>,
}

impl<C: CaseLike> AggregatedGroup<C> {
    fn singleton(id: String, member: C) -> Self {
        Self {
            id,
            case_type: member.case_type(),
            center: member.position(),
            members: vec![member],
        }
    }

    /// Append a member and move the center by the incremental mean
    /// `new = (old * (n - 1) + position) / n`, per axis.
    fn push(&mut self, member: C) {
        let n = (self.members.len() + 1) as f64;
        let position = member.position();

        self.center = GeoPoint::new(
            (self.center.latitude * (n - 1.0) + position.latitude) / n,
            (self.center.longitude * (n - 1.0) + position.longitude) / n,
        );
        self.members.push(member);
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// Pixel radius for the group's marker.
    pub fn marker_radius(&self) -> f64 {
        marker_radius(self.members.len())
    }
}

/// Rounding precision (decimal places) for a zoom level.
///
/// Anything below zoom 10, including nonsensical negative values, uses 0.
pub fn precision_for_zoom(zoom: i32) -> u32 {
    ZOOM_PRECISION
        .iter()
        .find(|(min_zoom, _)| zoom >= *min_zoom)
        .map(|(_, precision)| *precision)
        .unwrap_or(0)
}

/// Pixel radius of a map marker representing `member_count` cases.
///
/// Singletons get a fixed small radius; groups grow with the square root of
/// their size, capped at 20.
pub fn marker_radius(member_count: usize) -> f64 {
    if member_count <= 1 {
        return SINGLETON_MARKER_RADIUS;
    }
    (6.0 + (member_count as f64).sqrt() * 2.0).min(MAX_MARKER_RADIUS)
}

/// Bucket key: type plus coordinates scaled by 10^precision and rounded.
///
/// Integer cells keep `-0.0` and `0.0` in the same bucket.
type BucketKey = (CaseType, i64, i64);

fn bucket_key(case_type: CaseType, position: &GeoPoint, factor: f64) -> BucketKey {
    (
        case_type,
        (position.latitude * factor).round() as i64,
        (position.longitude * factor).round() as i64,
    )
}

fn bucket_id(key: &BucketKey, precision: u32, factor: f64) -> String {
    let decimals = precision as usize;
    format!(
        "{}:{:.*}:{:.*}",
        key.0,
        decimals,
        key.1 as f64 / factor,
        decimals,
        key.2 as f64 / factor
    )
}

/// Group cases for display at `zoom`.
///
/// At zoom 16 and above every case is returned as a singleton group in input
/// order. Below that, cases of the same type whose rounded coordinates match
/// share a group; groups come out in the order their first member was seen.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::{aggregate_cases, CaseReport, CaseType, GeoPoint};
///
/// let cases = vec![
///     CaseReport::new("a", CaseType::Confirmed, GeoPoint::new(0.0, 0.0)),
///     CaseReport::new("b", CaseType::Confirmed, GeoPoint::new(0.0, 0.2)),
/// ];
///
/// let groups = aggregate_cases(&cases, 5);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].center, GeoPoint::new(0.0, 0.1));
/// ```
pub fn aggregate_cases<C: CaseLike + Clone>(cases: &[C], zoom: i32) -> Vec<AggregatedGroup<C>> {
    let precision = precision_for_zoom(zoom);

    if precision >= NO_CLUSTERING_PRECISION {
        return cases
            .iter()
            .map(|case| AggregatedGroup::singleton(case.id().to_string(), case.clone()))
            .collect();
    }

    let factor = 10f64.powi(precision as i32);
    let mut groups: Vec<AggregatedGroup<C>> = Vec::new();
    let mut index: HashMap<BucketKey, usize> = HashMap::new();

    for case in cases {
        let key = bucket_key(case.case_type(), &case.position(), factor);

        match index.get(&key) {
            Some(&slot) => groups[slot].push(case.clone()),
            None => {
                index.insert(key, groups.len());
                let id = bucket_id(&key, precision, factor);
                groups.push(AggregatedGroup::singleton(id, case.clone()));
            }
        }
    }

    groups
}
