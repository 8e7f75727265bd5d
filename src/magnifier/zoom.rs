//! Adaptive zoom search.
//!
//! Picks the magnifier zoom from the regions around the cursor: the region
//! that most needs magnification (small on screen, close to the cursor, not yet
//! found) decides how far to zoom in, and no further.

use crate::core::{config::ZoomConfig, geo::Point, viewport::ViewportDescriptor};
use crate::magnifier::detector::DetectedRegion;
use fxhash::FxHashSet;
use serde::Serialize;
use std::cmp::Ordering;

/// Relative tolerance under which two importance scores count as equal
const IMPORTANCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct ZoomConstraints<'a> {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub target_screen_size_px: f64,
    pub found_suppression: f64,
    pub distance_falloff_px: f64,
    /// Regions already resolved by the game layer
    pub found: Option<&'a FxHashSet<String>>,
    /// Lowest zoom that keeps precision mode satisfied while the pointer is locked
    pub precision_floor: Option<f64>,
}

impl<'a> ZoomConstraints<'a> {
    pub fn from_config(config: &ZoomConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            target_screen_size_px: config.target_screen_size_px,
            found_suppression: config.found_suppression,
            distance_falloff_px: config.distance_falloff_px,
            found: None,
            precision_floor: None,
        }
    }

    pub fn with_found(mut self, found: &'a FxHashSet<String>) -> Self {
        self.found = Some(found);
        self
    }

    pub fn with_precision_floor(mut self, floor: Option<f64>) -> Self {
        self.precision_floor = floor;
        self
    }

    fn is_found(&self, id: &str) -> bool {
        self.found.is_some_and(|found| found.contains(id))
    }

    fn clamp(&self, zoom: f64) -> f64 {
        let (lo, hi) = (self.min_zoom, self.max_zoom.max(self.min_zoom));
        if zoom.is_nan() {
            lo
        } else {
            zoom.clamp(lo, hi)
        }
    }
}

/// How much a candidate wants magnification, kept for debug overlays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionImportance {
    pub id: String,
    pub importance: f64,
    /// Narrower dimension at zoom 1, in screen pixels
    pub base_screen_size: f64,
    /// Screen distance at zoom 1 from the anchor to the region center
    pub distance_px: f64,
    /// Zoom at which the region reaches the target size (unclamped)
    pub required_zoom: f64,
    pub is_found: bool,
    /// This region picked the final zoom
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoomSearchResult {
    pub zoom: f64,
    pub considered_regions: Vec<RegionImportance>,
}

impl ZoomSearchResult {
    pub fn accepted_region(&self) -> Option<&RegionImportance> {
        self.considered_regions.iter().find(|region| region.accepted)
    }
}

/// Finds the zoom that makes the most important unresolved candidate
/// comfortably visible.
///
/// `anchor` is the cursor in content space. The result always lies in
/// `[min_zoom, max_zoom]`; a precision floor raises it but never past
/// `max_zoom`.
pub fn find_optimal_zoom(
    candidates: &[DetectedRegion],
    anchor: Point,
    viewport: &ViewportDescriptor,
    constraints: &ZoomConstraints<'_>,
) -> ZoomSearchResult {
    let scale = viewport.scale();
    let falloff = constraints.distance_falloff_px.max(f64::MIN_POSITIVE);

    let mut considered: Vec<RegionImportance> = candidates
        .iter()
        .map(|candidate| {
            let base_screen_size = candidate.content_size * scale;
            let distance_px = viewport.content_to_pixels(anchor.distance_to(&candidate.center));
            let is_found = constraints.is_found(&candidate.id);

            let size_factor = 1.0 / (1.0 + base_screen_size.max(0.0));
            let distance_factor = 1.0 / (1.0 + distance_px / falloff);
            let suppression = if is_found { constraints.found_suppression } else { 1.0 };

            let required_zoom = if base_screen_size > 0.0 {
                constraints.target_screen_size_px / base_screen_size
            } else {
                f64::INFINITY
            };

            RegionImportance {
                id: candidate.id.clone(),
                importance: size_factor * distance_factor * suppression,
                base_screen_size,
                distance_px,
                required_zoom,
                is_found,
                accepted: false,
            }
        })
        .collect();

    considered.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.distance_px.total_cmp(&b.distance_px))
            .then_with(|| a.id.cmp(&b.id))
    });

    let target = considered
        .iter()
        .enumerate()
        .filter(|(_, region)| !region.is_found)
        .reduce(|best, next| if outranks(next.1, best.1) { next } else { best })
        .map(|(idx, _)| idx);

    let wanted = match target {
        Some(idx) => {
            considered[idx].accepted = true;
            considered[idx].required_zoom
        }
        None => constraints.min_zoom,
    };

    let mut zoom = constraints.clamp(wanted);
    if let Some(floor) = constraints.precision_floor {
        zoom = zoom.max(constraints.clamp(floor));
    }

    ZoomSearchResult {
        zoom,
        considered_regions: considered,
    }
}

/// Higher importance wins; near-equal scores prefer the closer region, then id
fn outranks(a: &RegionImportance, b: &RegionImportance) -> bool {
    let scale = a.importance.abs().max(b.importance.abs()).max(f64::MIN_POSITIVE);
    if (a.importance - b.importance).abs() > IMPORTANCE_EPSILON * scale {
        return a.importance > b.importance;
    }
    match a.distance_px.total_cmp(&b.distance_px) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => a.id < b.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounds::Bounds;

    fn viewport() -> ViewportDescriptor {
        ViewportDescriptor::new(
            Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0),
            Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0),
        )
    }

    fn candidate(id: &str, center: Point, content_size: f64) -> DetectedRegion {
        DetectedRegion {
            id: id.to_string(),
            center,
            pixel_width: content_size,
            pixel_height: content_size,
            pixel_area: content_size * content_size,
            is_very_small: content_size * content_size < 200.0,
            screen_size: content_size,
            content_size,
            distance_px: 0.0,
            contains_cursor: false,
        }
    }

    fn constraints<'a>() -> ZoomConstraints<'a> {
        ZoomConstraints::from_config(&ZoomConfig::default())
    }

    #[test]
    fn test_small_region_drives_zoom() {
        let candidates = vec![
            candidate("big", Point::new(100.0, 100.0), 200.0),
            candidate("small", Point::new(105.0, 100.0), 2.0),
        ];
        let result = find_optimal_zoom(&candidates, Point::new(100.0, 100.0), &viewport(), &constraints());

        assert!((result.zoom - 20.0).abs() < 1e-9);
        assert_eq!(result.accepted_region().unwrap().id, "small");
        assert_eq!(result.considered_regions.len(), 2);
    }

    #[test]
    fn test_zoom_stays_in_bounds() {
        let anchor = Point::new(100.0, 100.0);
        for size in [1e-9, 0.001, 0.5, 3.0, 40.0, 400.0, 1e9] {
            let result = find_optimal_zoom(&[candidate("r", anchor, size)], anchor, &viewport(), &constraints());
            assert!(result.zoom >= 1.0 && result.zoom <= 60.0, "size {size} gave {}", result.zoom);
        }

        let empty = find_optimal_zoom(&[], anchor, &viewport(), &constraints());
        assert_eq!(empty.zoom, 1.0);
    }

    #[test]
    fn test_found_regions_are_suppressed() {
        let mut found = FxHashSet::default();
        found.insert("small".to_string());

        let candidates = vec![
            candidate("small", Point::new(100.0, 100.0), 0.5),
            candidate("medium", Point::new(110.0, 100.0), 10.0),
        ];
        let constraints = constraints().with_found(&found);
        let result = find_optimal_zoom(&candidates, Point::new(100.0, 100.0), &viewport(), &constraints);

        assert_eq!(result.accepted_region().unwrap().id, "medium");
        assert!((result.zoom - 4.0).abs() < 1e-9);

        let small = result.considered_regions.iter().find(|r| r.id == "small").unwrap();
        assert!(small.is_found);
        assert!(!small.accepted);
    }

    #[test]
    fn test_only_found_regions_fall_back_to_min_zoom() {
        let mut found = FxHashSet::default();
        found.insert("small".to_string());
        let candidates = vec![candidate("small", Point::new(100.0, 100.0), 0.5)];
        let constraints = constraints().with_found(&found);
        let result = find_optimal_zoom(&candidates, Point::new(100.0, 100.0), &viewport(), &constraints);
        assert_eq!(result.zoom, 1.0);
        assert!(result.accepted_region().is_none());
    }

    #[test]
    fn test_equal_importance_prefers_closer_then_id() {
        let anchor = Point::new(100.0, 100.0);
        let candidates = vec![
            candidate("b", Point::new(110.0, 100.0), 2.0),
            candidate("a", Point::new(90.0, 100.0), 2.0),
        ];
        let result = find_optimal_zoom(&candidates, anchor, &viewport(), &constraints());
        assert_eq!(result.accepted_region().unwrap().id, "a");

        let close = candidate("z", Point::new(101.0, 100.0), 2.0);
        let result = find_optimal_zoom(&[candidates[0].clone(), close], anchor, &viewport(), &constraints());
        assert_eq!(result.accepted_region().unwrap().id, "z");
    }

    #[test]
    fn test_precision_floor_holds_zoom_up() {
        let anchor = Point::new(100.0, 100.0);
        let candidates = vec![candidate("wide", anchor, 20.0)];

        let free = find_optimal_zoom(&candidates, anchor, &viewport(), &constraints());
        assert!((free.zoom - 2.0).abs() < 1e-9);

        let locked = constraints().with_precision_floor(Some(33.0));
        let held = find_optimal_zoom(&candidates, anchor, &viewport(), &locked);
        assert!((held.zoom - 33.0).abs() < 1e-9);

        let beyond = constraints().with_precision_floor(Some(500.0));
        let capped = find_optimal_zoom(&candidates, anchor, &viewport(), &beyond);
        assert_eq!(capped.zoom, 60.0);
    }

    #[test]
    fn test_very_small_region_reaches_target_when_range_allows() {
        // 0.2 x 0.4 px at zoom 1: area 0.08 px^2
        let anchor = Point::new(100.0, 100.0);
        let mut speck = candidate("speck", anchor, 0.2);
        speck.pixel_width = 0.2;
        speck.pixel_height = 0.4;
        speck.pixel_area = 0.08;
        assert!(speck.is_very_small);

        let mut wide = constraints();
        wide.max_zoom = 1000.0;
        let result = find_optimal_zoom(&[speck], anchor, &viewport(), &wide);
        assert!(0.2 * result.zoom >= 40.0 - 1e-9);
    }
}
