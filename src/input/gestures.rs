use crate::{
    core::{config::GestureConfig, geo::Point, viewport::ViewportDescriptor},
    input::events::{InteractionEvent, TouchInput, TouchPhase},
};
use serde::Serialize;

/// Tap or drag, decided from the largest displacement seen during a touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotionKind {
    Tap,
    Drag,
}

/// Movement at or under `threshold` pixels is still a tap
pub fn classify_motion(max_displacement: f64, threshold: f64) -> MotionKind {
    if max_displacement <= threshold {
        MotionKind::Tap
    } else {
        MotionKind::Drag
    }
}

/// Zoom after a pinch, scaled by the finger distance ratio and clamped.
///
/// Monotonic in `current_distance`; `start_distance` is floored so two fingers
/// landing on top of each other cannot blow the ratio up.
pub fn pinch_zoom(
    start_distance: f64,
    start_zoom: f64,
    current_distance: f64,
    min_zoom: f64,
    max_zoom: f64,
    min_pinch_distance: f64,
) -> f64 {
    let start = start_distance.max(min_pinch_distance).max(f64::MIN_POSITIVE);
    let zoom = start_zoom * current_distance.max(0.0) / start;
    if zoom.is_nan() {
        return min_zoom;
    }
    zoom.clamp(min_zoom, max_zoom.max(min_zoom))
}

/// Per-event values the handler needs but does not own
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub viewport: &'a ViewportDescriptor,
    /// Container pixels of cursor travel per finger pixel over the lens
    pub magnifier_multiplier: f64,
    pub current_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

/// Turns raw touch lists into interaction events.
///
/// Holds no touch state of its own: everything that spans several events
/// (start position, displacement, pinch baseline) lives in the reducer's phase.
#[derive(Debug, Clone, Default)]
pub struct TouchGestureHandler {
    config: GestureConfig,
}

impl TouchGestureHandler {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn translate(&self, input: &TouchInput, ctx: &GestureContext<'_>) -> Vec<InteractionEvent> {
        let positions: Vec<Point> = input
            .touches
            .iter()
            .map(|touch| ctx.viewport.screen_to_container(touch.position))
            .collect();

        let event = match (input.phase, positions.as_slice()) {
            (TouchPhase::Start, [only]) => Some(InteractionEvent::TouchStart {
                position: *only,
                target: input.target,
            }),
            (TouchPhase::Start, [a, b, ..]) => Some(InteractionEvent::PinchStart {
                a: *a,
                b: *b,
                current_zoom: ctx.current_zoom,
            }),
            (TouchPhase::Move, [only]) => Some(InteractionEvent::TouchMove {
                position: *only,
                magnifier_multiplier: ctx.magnifier_multiplier,
                bounds: ctx.viewport.container_rect(),
            }),
            (TouchPhase::Move, [a, b, ..]) => Some(InteractionEvent::PinchMove {
                a: *a,
                b: *b,
                min_zoom: ctx.min_zoom,
                max_zoom: ctx.max_zoom,
            }),
            (TouchPhase::End, []) => Some(InteractionEvent::TouchEnd),
            (TouchPhase::Cancel, []) => Some(InteractionEvent::TouchCancel),
            (TouchPhase::End | TouchPhase::Cancel, [remaining]) => Some(InteractionEvent::PinchEnd {
                remaining: *remaining,
            }),
            // A third finger lifted: re-baseline on the two still down
            (TouchPhase::End | TouchPhase::Cancel, [a, b, ..]) => Some(InteractionEvent::PinchStart {
                a: *a,
                b: *b,
                current_zoom: ctx.current_zoom,
            }),
            (TouchPhase::Start | TouchPhase::Move, []) => None,
        };

        if event.is_none() {
            log::trace!("ignoring {:?} with no active touches", input.phase);
        }
        event.into_iter().collect()
    }
}
