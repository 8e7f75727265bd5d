//! Empirical scale measurement.
//!
//! The magnifier is drawn through several stacked transforms (viewport fit,
//! lens fit, zoom) and small errors compound. Instead of trusting the
//! arithmetic, two invisible probes are placed a known content distance apart
//! around the anchor and the renderer reports where they actually landed.

use crate::core::{config::ProbeConfig, geo::Point};
use crate::core::lens::LensTransform;
use crate::traits::CoordinateTransform;
use serde::Serialize;

/// Reads back where content-space probes were rendered on screen.
///
/// Implemented by the rendering layer. `None` means the probe element is not
/// mounted or not laid out yet.
pub trait ProbeLayout {
    fn probe_screen_position(&self, content: Point) -> Option<Point>;
}

/// Calculated layout: where the lens transform says a probe should land
impl ProbeLayout for LensTransform {
    fn probe_screen_position(&self, content: Point) -> Option<Point> {
        Some(self.to_screen(content))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeMeasurement {
    pub pixels_per_content_unit: f64,
    /// False when the value came from the calculated fallback
    pub is_valid: bool,
}

/// The two probe positions in content space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbePair {
    pub left: Point,
    pub right: Point,
}

impl ProbePair {
    pub fn around(anchor: Point, separation: f64) -> Self {
        let half = separation / 2.0;
        Self {
            left: Point::new(anchor.x - half, anchor.y),
            right: Point::new(anchor.x + half, anchor.y),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScaleMeasurer {
    config: ProbeConfig,
}

impl ScaleMeasurer {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn probes(&self, anchor: Point) -> ProbePair {
        ProbePair::around(anchor, self.config.separation_units)
    }

    /// Measures pixels per content unit around `anchor`.
    ///
    /// `fallback` is the calculated chain (lens scale) used when the layout
    /// cannot be trusted.
    pub fn measure(&self, anchor: Point, layout: &dyn ProbeLayout, fallback: f64) -> ProbeMeasurement {
        let probes = self.probes(anchor);
        let observed = layout
            .probe_screen_position(probes.left)
            .zip(layout.probe_screen_position(probes.right))
            .map(|(left, right)| left.distance_to(&right));

        match observed {
            Some(distance) if distance.is_finite() && distance >= self.config.min_distance_px => {
                ProbeMeasurement {
                    pixels_per_content_unit: distance / self.config.separation_units,
                    is_valid: true,
                }
            }
            other => {
                log::debug!(
                    "probe measurement degenerate ({:?}), using calculated scale {:.4}",
                    other,
                    fallback
                );
                ProbeMeasurement {
                    pixels_per_content_unit: fallback,
                    is_valid: false,
                }
            }
        }
    }
}
