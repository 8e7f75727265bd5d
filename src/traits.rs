//! Shared trait abstractions for coordinate mapping
//!
//! Both the main map viewport and the magnifier lens map content space onto
//! screen pixels. Code that only needs "where does this content point land"
//! (probe layouts, debug overlays) works against this trait instead of a
//! concrete transform.

use crate::core::geo::Point;

/// A uniform-scale mapping between content space and screen pixels
pub trait CoordinateTransform {
    /// Content-space point to screen pixels
    fn to_screen(&self, content: Point) -> Point;

    /// Screen pixels to content space
    fn to_content(&self, screen: Point) -> Point;

    /// Screen pixels per content unit
    fn pixels_per_unit(&self) -> f64;

    /// Converts a screen-space delta into a content-space delta
    fn delta_to_content(&self, delta: Point) -> Point {
        let scale = self.pixels_per_unit();
        if scale > 0.0 && scale.is_finite() {
            delta.multiply(1.0 / scale)
        } else {
            delta
        }
    }
}
