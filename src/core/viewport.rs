use crate::core::{bounds::Bounds, geo::Point};
use crate::traits::CoordinateTransform;
use serde::{Deserialize, Serialize};

/// Snapshot of how the content box is fitted into the rendered element.
///
/// Built fresh from live layout on every input event or frame. Nothing derived
/// from it is cached; `scale` and `letterbox` are recomputed on each call,
/// which is cheap and keeps the descriptor `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportDescriptor {
    /// The visible map extent in content units (the SVG view box)
    pub content: Bounds,
    /// The rendered element's rectangle in screen pixels
    pub element: Bounds,
}

impl ViewportDescriptor {
    pub fn new(content: Bounds, element: Bounds) -> Self {
        Self { content, element }
    }

    /// Both rectangles have a usable, finite size
    pub fn is_laid_out(&self) -> bool {
        !self.content.is_degenerate() && !self.element.is_degenerate()
    }

    /// Screen pixels per content unit.
    ///
    /// The fit is constrained by whichever axis is relatively smaller. Falls back
    /// to a neutral `1.0` while the element has no size.
    pub fn scale(&self) -> f64 {
        if !self.is_laid_out() {
            return 1.0;
        }
        let content_aspect = self.content.aspect_ratio();
        let element_aspect = self.element.aspect_ratio();
        if content_aspect > element_aspect {
            self.element.width() / self.content.width()
        } else {
            self.element.height() / self.content.height()
        }
    }

    /// Padding on each side of the fitted content, in pixels
    pub fn letterbox(&self) -> Point {
        if !self.is_laid_out() {
            return Point::default();
        }
        let scale = self.scale();
        Point::new(
            (self.element.width() - self.content.width() * scale) / 2.0,
            (self.element.height() - self.content.height() * scale) / 2.0,
        )
    }

    /// Element rectangle in container coordinates
    pub fn container_rect(&self) -> Bounds {
        self.element.at_origin()
    }

    /// Screen point to container point (relative to the element's top-left)
    pub fn screen_to_container(&self, screen: Point) -> Point {
        screen.subtract(&self.element.min)
    }

    pub fn container_to_screen(&self, container: Point) -> Point {
        container.add(&self.element.min)
    }

    /// Container point to content space
    pub fn container_to_content(&self, container: Point) -> Point {
        let letterbox = self.letterbox();
        let scale = self.scale();
        Point::new(
            (container.x - letterbox.x) / scale + self.content.min.x,
            (container.y - letterbox.y) / scale + self.content.min.y,
        )
    }

    /// Content point to container coordinates
    pub fn content_to_container(&self, content: Point) -> Point {
        let letterbox = self.letterbox();
        let scale = self.scale();
        Point::new(
            (content.x - self.content.min.x) * scale + letterbox.x,
            (content.y - self.content.min.y) * scale + letterbox.y,
        )
    }

    pub fn to_content_space(&self, screen: Point) -> Point {
        self.container_to_content(self.screen_to_container(screen))
    }

    pub fn to_screen_space(&self, content: Point) -> Point {
        self.container_to_screen(self.content_to_container(content))
    }

    /// Length in pixels to length in content units
    pub fn pixels_to_content(&self, pixels: f64) -> f64 {
        pixels / self.scale()
    }

    /// Length in content units to length in pixels
    pub fn content_to_pixels(&self, units: f64) -> f64 {
        units * self.scale()
    }
}

impl CoordinateTransform for ViewportDescriptor {
    fn to_screen(&self, content: Point) -> Point {
        self.to_screen_space(content)
    }

    fn to_content(&self, screen: Point) -> Point {
        self.to_content_space(screen)
    }

    fn pixels_per_unit(&self) -> f64 {
        self.scale()
    }
}
