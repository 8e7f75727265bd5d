//! Read-only projection of the pointer internals for debug overlays.

use super::{CursorPosition, PrecisionPointer};
use crate::input::state::InteractionState;
use crate::magnifier::{
    detector::DetectionResult, precision::PrecisionAssessment, probe::ProbeMeasurement,
    zoom::ZoomSearchResult,
};
use crate::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugSnapshot {
    pub phase: &'static str,
    pub state: InteractionState,
    pub cursor: Option<CursorPosition>,
    pub current_zoom: f64,
    pub target_zoom: f64,
    pub opacity: f64,
    /// Zoom spring or opacity fade still moving
    pub animating: bool,
    pub detection: DetectionResult,
    pub zoom_search: Option<ZoomSearchResult>,
    pub precision: Option<PrecisionAssessment>,
    pub probe: Option<ProbeMeasurement>,
    pub precision_hint_visible: bool,
    pub found_regions: usize,
    pub pinned_zoom: Option<f64>,
}

impl PrecisionPointer {
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            phase: self.state.phase_name(),
            state: self.state.clone(),
            cursor: self.cursor(),
            current_zoom: self.animator.current_zoom(),
            target_zoom: self.animator.target_zoom(),
            opacity: self.animator.opacity(),
            animating: !self.animator.is_settled(),
            detection: self.last_detection.clone(),
            zoom_search: self.last_zoom_search.clone(),
            precision: self.last_assessment,
            probe: self.last_probe,
            precision_hint_visible: self.precision.hint_visible(),
            found_regions: self.found.len(),
            pinned_zoom: self.pinned_zoom,
        }
    }

    pub fn debug_snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.debug_snapshot())?)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{bounds::Bounds, config::PointerOptions, geo::Point, viewport::ViewportDescriptor};
    use crate::input::{events::PointerInput, state::InputMode};
    use crate::pointer::PrecisionPointer;
    use crate::spatial::catalog::{RegionCatalog, RegionDescriptor};
    use std::sync::Arc;

    #[test]
    fn test_snapshot_reflects_detection() {
        let catalog = RegionCatalog::from_regions(vec![RegionDescriptor::from_bounds(
            "reef",
            "Reef",
            Bounds::from_xywh(50.0, 50.0, 1.0, 1.0),
        )
        .unwrap()])
        .unwrap();
        let mut pointer = PrecisionPointer::new(Arc::new(catalog), PointerOptions::default(), InputMode::Desktop);
        let viewport = ViewportDescriptor::new(
            Bounds::from_xywh(0.0, 0.0, 100.0, 100.0),
            Bounds::from_xywh(0.0, 0.0, 100.0, 100.0),
        );
        pointer.handle_pointer(PointerInput::moved(Point::new(50.5, 50.5)), &viewport);

        let snapshot = pointer.debug_snapshot();
        assert_eq!(snapshot.phase, "magnifier_active");
        assert_eq!(snapshot.detection.region_under_cursor.as_deref(), Some("reef"));
        assert!(snapshot.zoom_search.is_some());

        let json = pointer.debug_snapshot_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"], "magnifier_active");
        assert_eq!(value["detection"]["region_under_cursor"], "reef");
    }
}
