//! Arc-length highlight windows (legacy waterway strategy).
//!
//! Instead of thresholding each segment directly, this strategy marks a
//! window of arc length around every place where a zone touches the line,
//! widened to at least `min_extension_meters` (or the zone radius, whichever
//! is larger). Overlapping windows are merged and the vertices falling in the
//! merged windows are extracted as sub-polylines.
//!
//! [`crate::segments_near_zones`] is the canonical strategy; this one is kept
//! for dashboards that want the wider, smoother highlight.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{cumulative_arc_length, point_to_segment_distance};
use crate::proximity::polygon_touches_zones;
use crate::{Circle, GeoPoint, Segment, WaterFeature};

/// Configuration for highlight windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Minimum half-width of a window (meters).
    /// Default: 500.0
    pub min_extension_meters: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            min_extension_meters: 500.0,
        }
    }
}

/// An interval of cumulative arc length along a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightWindow {
    pub start_meters: f64,
    pub end_meters: f64,
}

impl HighlightWindow {
    pub fn new(start_meters: f64, end_meters: f64) -> Self {
        Self {
            start_meters,
            end_meters,
        }
    }

    pub fn contains(&self, meters: f64) -> bool {
        meters >= self.start_meters && meters <= self.end_meters
    }

    /// Whether the window intersects `[from, to]`.
    pub fn overlaps(&self, from: f64, to: f64) -> bool {
        self.start_meters <= to && self.end_meters >= from
    }
}

/// Windows around every edge of `path` that passes within a zone's radius.
///
/// `cumulative` must come from [`cumulative_arc_length`] on the same path.
/// Each window is centred on the arc position of the point closest to the
/// zone center and clamped to the polyline.
pub fn highlight_windows(
    path: &[GeoPoint],
    cumulative: &[f64],
    zones: &[Circle],
    config: &HighlightConfig,
) -> Vec<HighlightWindow> {
    if path.len() < 2 || cumulative.len() != path.len() {
        return vec![];
    }

    let total = cumulative[cumulative.len() - 1];
    let mut windows = Vec::new();

    for zone in zones {
        let extension = config.min_extension_meters.max(zone.radius_meters);

        for (i, pair) in path.windows(2).enumerate() {
            let proj = point_to_segment_distance(&zone.center, &pair[0], &pair[1]);
            if proj.distance_meters > zone.radius_meters {
                continue;
            }

            let edge_length = cumulative[i + 1] - cumulative[i];
            let position = cumulative[i] + proj.fraction_along_segment * edge_length;
            windows.push(HighlightWindow::new(
                (position - extension).max(0.0),
                (position + extension).min(total),
            ));
        }
    }

    windows
}

/// Union of `windows`, sorted by start.
///
/// Windows that overlap or touch are merged; inverted or NaN windows are
/// dropped. The result never contains two overlapping windows.
///
/// # Example
///
/// ```rust
/// use outbreak_geo::highlight::{merge_windows, HighlightWindow};
///
/// let merged = merge_windows(&[
///     HighlightWindow::new(800.0, 1200.0),
///     HighlightWindow::new(0.0, 500.0),
///     HighlightWindow::new(400.0, 900.0),
///     HighlightWindow::new(2000.0, 2100.0),
/// ]);
/// assert_eq!(merged, vec![
///     HighlightWindow::new(0.0, 1200.0),
///     HighlightWindow::new(2000.0, 2100.0),
/// ]);
/// ```
pub fn merge_windows(windows: &[HighlightWindow]) -> Vec<HighlightWindow> {
    let mut sorted: Vec<HighlightWindow> = windows
        .iter()
        .copied()
        .filter(|w| w.start_meters <= w.end_meters)
        .collect();
    sorted.sort_by(|a, b| a.start_meters.total_cmp(&b.start_meters));

    let mut merged: Vec<HighlightWindow> = Vec::with_capacity(sorted.len());
    for window in sorted {
        match merged.last_mut() {
            Some(last) if window.start_meters <= last.end_meters => {
                last.end_meters = last.end_meters.max(window.end_meters);
            }
            _ => merged.push(window),
        }
    }

    merged
}

/// Per-vertex mask: a vertex is masked when it lies inside a window or ends
/// an edge that a window overlaps.
pub fn mask_vertices(cumulative: &[f64], windows: &[HighlightWindow]) -> Vec<bool> {
    let mut mask: Vec<bool> = cumulative
        .iter()
        .map(|&s| windows.iter().any(|w| w.contains(s)))
        .collect();

    for i in 0..cumulative.len().saturating_sub(1) {
        let (from, to) = (cumulative[i], cumulative[i + 1]);
        if windows.iter().any(|w| w.overlaps(from, to)) {
            mask[i] = true;
            mask[i + 1] = true;
        }
    }

    mask
}

/// Contiguous runs of at least two masked vertices.
pub fn extract_masked_segments(
    feature_id: &str,
    path: &[GeoPoint],
    mask: &[bool],
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;

    for i in 0..=path.len().min(mask.len()) {
        let masked = i < path.len() && i < mask.len() && mask[i];
        match (masked, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                if i - start >= 2 {
                    let run = &path[start..i];
                    segments.push(Segment::from_run(feature_id, segments.len(), run));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    segments
}

/// Highlight the parts of `features` near `zones` using arc-length windows.
///
/// Polygons follow the same rule as [`crate::segments_near_zones`]: included
/// whole when any vertex is inside a zone.
pub fn highlight_segments_near_zones(
    features: &[WaterFeature],
    zones: &[Circle],
    config: &HighlightConfig,
) -> Vec<Segment> {
    if zones.is_empty() {
        return vec![];
    }

    let mut segments = Vec::new();

    for feature in features {
        if feature.is_polygon {
            if polygon_touches_zones(&feature.path, zones) {
                segments.push(Segment::from_run(&feature.id, 0, &feature.path));
            }
            continue;
        }

        let cumulative = cumulative_arc_length(&feature.path);
        let raw = highlight_windows(&feature.path, &cumulative, zones, config);
        let windows = merge_windows(&raw);
        if windows.is_empty() {
            continue;
        }

        let mask = mask_vertices(&cumulative, &windows);
        segments.extend(extract_masked_segments(&feature.id, &feature.path, &mask));
    }

    debug!(
        "[Highlight] {} features x {} zones -> {} segments",
        features.len(),
        zones.len(),
        segments.len()
    );

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn river(n: usize) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| GeoPoint::new(18.50 + i as f64 * 0.01, 73.857))
            .collect()
    }

    #[test]
    fn test_merge_overlapping_and_touching() {
        let merged = merge_windows(&[
            HighlightWindow::new(0.0, 100.0),
            HighlightWindow::new(100.0, 200.0),
            HighlightWindow::new(50.0, 80.0),
        ]);
        assert_eq!(merged, vec![HighlightWindow::new(0.0, 200.0)]);
    }

    #[test]
    fn test_merge_drops_inverted() {
        let merged = merge_windows(&[
            HighlightWindow::new(300.0, 100.0),
            HighlightWindow::new(0.0, 10.0),
        ]);
        assert_eq!(merged, vec![HighlightWindow::new(0.0, 10.0)]);
    }

    #[test]
    fn test_merged_windows_never_overlap() {
        let raw: Vec<HighlightWindow> = (0..30)
            .map(|i| {
                let start = ((i * 37) % 101) as f64 * 10.0;
                HighlightWindow::new(start, start + ((i * 13) % 7) as f64 * 25.0)
            })
            .collect();
        let merged = merge_windows(&raw);
        for pair in merged.windows(2) {
            assert!(pair[0].end_meters < pair[1].start_meters);
        }
    }

    #[test]
    fn test_windows_clamped_to_polyline() {
        let path = river(3);
        let cumulative = cumulative_arc_length(&path);
        let zones = [Circle::new(path[0], 100.0)];

        let config = HighlightConfig::default();
        let windows = highlight_windows(&path, &cumulative, &zones, &config);
        assert!(!windows.is_empty());
        for w in &windows {
            assert!(w.start_meters >= 0.0);
            assert!(w.end_meters <= cumulative[2]);
        }
        // Minimum extension applies to small zones
        let merged = merge_windows(&windows);
        assert!((merged[0].end_meters - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_mask_marks_edge_endpoints() {
        let cumulative = [0.0, 1000.0, 2000.0, 3000.0];
        let mask = mask_vertices(&cumulative, &[HighlightWindow::new(1200.0, 1400.0)]);
        assert_eq!(mask, vec![false, true, true, false]);
    }

    #[test]
    fn test_extract_runs() {
        let path = river(6);
        let mask = [true, true, false, true, false, true];
        let segments = extract_masked_segments("way/1", &path, &mask);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, "way/1-0");
        assert_eq!(segments[0].path, path[0..2].to_vec());
    }

    #[test]
    fn test_extract_run_to_end() {
        let path = river(4);
        let segments = extract_masked_segments("w", &path, &[false, true, true, true]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].path, path[1..].to_vec());
    }

    #[test]
    fn test_highlight_pipeline() {
        let path = river(10);
        let feature = WaterFeature::line("way/5", path.clone());
        let zones = [Circle::new(path[5], 700.0)];

        let config = HighlightConfig::default();
        let segments = highlight_segments_near_zones(&[feature], &zones, &config);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].path.contains(&path[5]));
        assert!(!segments[0].path.contains(&path[0]));
        assert!(!segments[0].path.contains(&path[9]));
    }

    #[test]
    fn test_highlight_polygon_rule() {
        let ring = vec![
            GeoPoint::new(18.52, 73.85),
            GeoPoint::new(18.52, 73.86),
            GeoPoint::new(18.53, 73.86),
        ];
        let lake = [WaterFeature::polygon("way/6", ring)];
        let inside = [Circle::new(GeoPoint::new(18.52, 73.85), 100.0)];
        let outside = [Circle::new(GeoPoint::new(18.40, 73.85), 100.0)];
        let config = HighlightConfig::default();

        let touching = highlight_segments_near_zones(&lake, &inside, &config);
        let distant = highlight_segments_near_zones(&lake, &outside, &config);
        assert_eq!(touching.len(), 1);
        assert!(distant.is_empty());
    }
}
