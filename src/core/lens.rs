//! Geometry of the magnifier overlay.
//!
//! The magnifier renders a content-space box of `content / zoom` centered on
//! the anchor, fitted into the lens rectangle with uniform scaling.

use crate::core::{bounds::Bounds, geo::Point};
use crate::traits::CoordinateTransform;
use serde::{Deserialize, Serialize};

/// Size of the magnifier overlay in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnifierLens {
    pub width: f64,
    pub height: f64,
}

impl MagnifierLens {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Magnifier pixels per content unit at `zoom`
    pub fn scale(&self, zoom: f64, content: &Bounds) -> f64 {
        if content.is_degenerate() {
            return zoom.max(f64::MIN_POSITIVE);
        }
        (self.width * zoom / content.width()).min(self.height * zoom / content.height())
    }

    /// Content-space box shown by the magnifier when centered on `center`
    pub fn view_box(&self, center: Point, zoom: f64, content: &Bounds) -> Bounds {
        let zoom = zoom.max(f64::MIN_POSITIVE);
        Bounds::from_center_and_size(center, content.width() / zoom, content.height() / zoom)
    }

    /// Places the lens on screen at `origin` (its top-left corner) showing the
    /// box around `center`
    pub fn placed(&self, origin: Point, center: Point, zoom: f64, content: &Bounds) -> LensTransform {
        let view_box = self.view_box(center, zoom, content);
        let scale = self.scale(zoom, content);
        let letterbox = Point::new(
            (self.width - view_box.width() * scale) / 2.0,
            (self.height - view_box.height() * scale) / 2.0,
        );
        LensTransform {
            origin: origin.add(&letterbox),
            view_box,
            scale,
        }
    }
}

impl Default for MagnifierLens {
    fn default() -> Self {
        Self::new(
            crate::core::constants::DEFAULT_LENS_SIZE.0,
            crate::core::constants::DEFAULT_LENS_SIZE.1,
        )
    }
}

/// Container-pixel cursor movement per magnifier pixel of finger movement.
///
/// A finger dragging across the magnifier covers `1 / magnifier_scale` content
/// units per pixel, which is `viewport_scale / magnifier_scale` main-map pixels.
pub fn touch_multiplier(viewport_scale: f64, magnifier_scale: f64) -> f64 {
    if magnifier_scale > 0.0 && magnifier_scale.is_finite() {
        viewport_scale / magnifier_scale
    } else {
        1.0
    }
}

/// A magnifier placed on screen: maps content inside its view box to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensTransform {
    /// Screen position of the view box's top-left corner
    pub origin: Point,
    pub view_box: Bounds,
    pub scale: f64,
}

impl CoordinateTransform for LensTransform {
    fn to_screen(&self, content: Point) -> Point {
        content
            .subtract(&self.view_box.min)
            .multiply(self.scale)
            .add(&self.origin)
    }

    fn to_content(&self, screen: Point) -> Point {
        screen
            .subtract(&self.origin)
            .multiply(1.0 / self.scale)
            .add(&self.view_box.min)
    }

    fn pixels_per_unit(&self) -> f64 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> Bounds {
        Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0)
    }

    #[test]
    fn test_lens_scale_uses_tighter_axis() {
        let lens = MagnifierLens::new(300.0, 200.0);
        // min(300*10/1000, 200*10/500) = min(3, 4)
        assert!((lens.scale(10.0, &content()) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_view_box_is_centered() {
        let lens = MagnifierLens::new(300.0, 200.0);
        let view_box = lens.view_box(Point::new(500.0, 250.0), 10.0, &content());
        assert_eq!(view_box, Bounds::from_xywh(450.0, 225.0, 100.0, 50.0));
    }

    #[test]
    fn test_touch_multiplier_scenario() {
        let lens = MagnifierLens::new(300.0, 200.0);
        let multiplier = touch_multiplier(1.0, lens.scale(10.0, &content()));
        assert!((multiplier - 1.0 / 3.0).abs() < 1e-9);
        assert!((30.0 * multiplier - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_placed_lens_round_trip() {
        let lens = MagnifierLens::new(300.0, 200.0);
        let placed = lens.placed(Point::new(20.0, 20.0), Point::new(500.0, 250.0), 10.0, &content());

        let anchor_on_screen = placed.to_screen(Point::new(500.0, 250.0));
        assert!((anchor_on_screen.x - 170.0).abs() < 1e-9);
        assert!((anchor_on_screen.y - 120.0).abs() < 1e-9);

        let back = placed.to_content(anchor_on_screen);
        assert!(back.distance_to(&Point::new(500.0, 250.0)) < 1e-9);
    }
}
