use crate::core::geo::Point;
use crate::{PointerError, Result};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle used for content boxes, element rectangles and
/// region bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from an origin plus size, the way DOM rects and SVG
    /// view boxes describe themselves
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_coords(x, y, x + width, y + height)
    }

    /// Creates bounds from a center point and size
    pub fn from_center_and_size(center: Point, width: f64, height: f64) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self::new(
            Point::new(center.x - half_width, center.y - half_height),
            Point::new(center.x + half_width, center.y + half_height),
        )
    }

    /// Parses an SVG `viewBox` attribute (`"x y width height"`, commas allowed)
    pub fn parse_view_box(view_box: &str) -> Result<Self> {
        let values = view_box
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PointerError::InvalidViewBox(format!("{view_box:?}: {e}")))?;

        match values.as_slice() {
            [x, y, width, height] if *width > 0.0 && *height > 0.0 => {
                Ok(Self::from_xywh(*x, *y, *width, *height))
            }
            [_, _, _, _] => Err(PointerError::InvalidViewBox(format!(
                "{view_box:?}: width and height must be positive"
            ))),
            _ => Err(PointerError::InvalidViewBox(format!(
                "{view_box:?}: expected four numbers, got {}",
                values.len()
            ))),
        }
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Gets the size as a Point
    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    /// Width divided by height; zero for degenerate bounds
    pub fn aspect_ratio(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.width() / self.height()
        }
    }

    /// True when either side is zero, negative or not finite (an element that
    /// has not been laid out yet)
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0)
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Returns a new bounds expanded by the given amount on every side
    pub fn expanded(&self, amount: f64) -> Bounds {
        Bounds::new(
            Point::new(self.min.x - amount, self.min.y - amount),
            Point::new(self.max.x + amount, self.max.y + amount),
        )
    }

    /// Same rectangle moved so that its top-left corner sits at the origin
    pub fn at_origin(&self) -> Bounds {
        Bounds::from_xywh(0.0, 0.0, self.width(), self.height())
    }

    /// Clamps a point to be within the bounds
    pub fn clamp(&self, point: &Point) -> Point {
        Point::new(
            point.x.clamp(self.min.x, self.max.x.max(self.min.x)),
            point.y.clamp(self.min.y, self.max.y.max(self.min.y)),
        )
    }

    /// Creates empty bounds (invalid bounds that can be extended)
    pub fn empty() -> Self {
        Self::new(
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0))
    }
}

impl From<geo_types::Rect<f64>> for Bounds {
    fn from(rect: geo_types::Rect<f64>) -> Self {
        Bounds::new(rect.min().into(), rect.max().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::from_coords(10.0, 20.0, 30.0, 40.0);
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 20.0);
        assert_eq!(bounds.center(), Point::new(20.0, 30.0));

        let rect = Bounds::from_xywh(5.0, 5.0, 100.0, 50.0);
        assert_eq!(rect.max, Point::new(105.0, 55.0));
        assert_eq!(rect.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::from_coords(10.0, 20.0, 30.0, 40.0);
        assert!(bounds.contains(&Point::new(15.0, 25.0)));
        assert!(!bounds.contains(&Point::new(5.0, 25.0)));
    }

    #[test]
    fn test_degenerate_bounds() {
        assert!(Bounds::from_xywh(0.0, 0.0, 0.0, 100.0).is_degenerate());
        assert!(Bounds::from_xywh(0.0, 0.0, 100.0, f64::NAN).is_degenerate());
        assert!(!Bounds::from_xywh(0.0, 0.0, 1.0, 1.0).is_degenerate());
        assert_eq!(Bounds::default().aspect_ratio(), 0.0);
    }

    #[test]
    fn test_parse_view_box() {
        let bounds = Bounds::parse_view_box("0 0 1000 500").unwrap();
        assert_eq!(bounds, Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0));

        let commas = Bounds::parse_view_box("-10, 20.5,300 ,400").unwrap();
        assert_eq!(commas.min, Point::new(-10.0, 20.5));
        assert_eq!(commas.size(), Point::new(300.0, 400.0));
    }

    #[test]
    fn test_parse_view_box_rejects_garbage() {
        assert!(Bounds::parse_view_box("0 0 1000").is_err());
        assert!(Bounds::parse_view_box("0 0 abc 10").is_err());
        assert!(Bounds::parse_view_box("0 0 0 10").is_err());
    }

    #[test]
    fn test_clamp_and_expand() {
        let bounds = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bounds.clamp(&Point::new(-5.0, 20.0)), Point::new(0.0, 10.0));
        assert_eq!(bounds.expanded(2.0), Bounds::from_coords(-2.0, -2.0, 12.0, 12.0));
    }
}
