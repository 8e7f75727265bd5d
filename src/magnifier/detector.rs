use crate::core::{config::DetectionConfig, geo::Point, viewport::ViewportDescriptor};
use crate::spatial::catalog::{RegionCatalog, RegionDescriptor};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// A region near the cursor with its footprint at the current zoom.
///
/// Pixel metrics depend on the viewport and zoom of the query, so they live
/// here rather than on the descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedRegion {
    pub id: String,
    /// Content-space label anchor
    pub center: Point,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub pixel_area: f64,
    pub is_very_small: bool,
    /// Narrower on-screen dimension
    pub screen_size: f64,
    /// Narrower bounding-box dimension in content units (zoom independent)
    pub content_size: f64,
    /// Screen distance from the cursor to the region outline (0 when inside)
    pub distance_px: f64,
    pub contains_cursor: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DetectionResult {
    pub region_under_cursor: Option<String>,
    /// Ordered by distance from the cursor, then id
    pub detected_regions: Vec<DetectedRegion>,
    /// Smallest `screen_size` among candidates
    pub detected_smallest_size: Option<f64>,
}

impl DetectionResult {
    pub fn has_very_small_region(&self) -> bool {
        self.detected_regions.iter().any(|region| region.is_very_small)
    }

    pub fn is_empty(&self) -> bool {
        self.detected_regions.is_empty()
    }
}

/// Finds the regions around a screen point
#[derive(Clone)]
pub struct RegionDetector {
    catalog: Arc<RegionCatalog>,
    config: DetectionConfig,
}

impl RegionDetector {
    pub fn new(catalog: Arc<RegionCatalog>, config: DetectionConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Arc<RegionCatalog> {
        &self.catalog
    }

    /// Detects regions around a screen-space point.
    ///
    /// `zoom` multiplies the viewport scale: 1.0 for the main map, the magnifier
    /// zoom when querying what the lens shows.
    pub fn detect(&self, screen: Point, viewport: &ViewportDescriptor, zoom: f64) -> DetectionResult {
        self.detect_content(viewport.to_content_space(screen), viewport, zoom)
    }

    pub fn detect_content(
        &self,
        content: Point,
        viewport: &ViewportDescriptor,
        zoom: f64,
    ) -> DetectionResult {
        let pixels_per_unit = viewport.scale() * zoom.max(f64::MIN_POSITIVE);
        // The tolerance is fixed in pixels, so it covers more content as zoom drops
        let tolerance = self.config.radius_px / pixels_per_unit;

        let mut detected: Vec<DetectedRegion> = self
            .catalog
            .candidates_near(&content, tolerance)
            .filter_map(|region| {
                let distance = region.distance_to(&content);
                (distance <= tolerance).then(|| self.measure(region, distance, pixels_per_unit))
            })
            .collect();

        detected.sort_by(|a, b| {
            a.distance_px
                .partial_cmp(&b.distance_px)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        let region_under_cursor = detected
            .iter()
            .filter(|region| region.contains_cursor)
            .min_by(|a, b| {
                a.pixel_area
                    .partial_cmp(&b.pixel_area)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|region| region.id.clone());

        let detected_smallest_size = detected
            .iter()
            .map(|region| region.screen_size)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        DetectionResult {
            region_under_cursor,
            detected_regions: detected,
            detected_smallest_size,
        }
    }

    fn measure(&self, region: &RegionDescriptor, distance: f64, pixels_per_unit: f64) -> DetectedRegion {
        let pixel_width = region.bounding_box.width() * pixels_per_unit;
        let pixel_height = region.bounding_box.height() * pixels_per_unit;
        let pixel_area = pixel_width * pixel_height;

        DetectedRegion {
            id: region.id.clone(),
            center: region.center,
            pixel_width,
            pixel_height,
            pixel_area,
            is_very_small: pixel_width < 1.0
                || pixel_height < 1.0
                || pixel_area < self.config.very_small_area_px2,
            screen_size: pixel_width.min(pixel_height),
            content_size: region.bounding_box.width().min(region.bounding_box.height()),
            distance_px: distance * pixels_per_unit,
            contains_cursor: distance == 0.0,
        }
    }
}
