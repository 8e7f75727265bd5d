use crate::core::{bounds::Bounds, geo::Point};
use serde::{Deserialize, Serialize};

/// Which surface a touch landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchTarget {
    Map,
    Magnifier,
}

/// Raw mouse input as delivered by the UI shell, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub action: PointerAction,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerAction {
    Move,
    Down,
    Up,
    /// Pointer left the map element
    Leave,
}

impl PointerInput {
    pub fn moved(position: Point) -> Self {
        Self {
            action: PointerAction::Move,
            position,
        }
    }

    pub fn down(position: Point) -> Self {
        Self {
            action: PointerAction::Down,
            position,
        }
    }

    pub fn up(position: Point) -> Self {
        Self {
            action: PointerAction::Up,
            position,
        }
    }
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

/// Raw touch input. `touches` is the list of fingers still down after the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub touches: Vec<TouchPoint>,
    pub target: TouchTarget,
}

impl TouchInput {
    pub fn new(phase: TouchPhase, target: TouchTarget, positions: &[Point]) -> Self {
        Self {
            phase,
            touches: positions
                .iter()
                .enumerate()
                .map(|(id, &position)| TouchPoint {
                    id: id as u64,
                    position,
                })
                .collect(),
            target,
        }
    }
}

/// Events understood by the interaction reducer.
///
/// Positions are container coordinates (pixels from the map element's
/// top-left corner); the orchestrator converts before dispatching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionEvent {
    PointerMove { position: Point },
    PointerDownOnMap { position: Point },
    PointerUp { position: Point },
    EnterMagnifierZone,
    LeaveMagnifierZone,
    RequestLock,
    LockGranted,
    LockDenied,
    /// The platform released the lock on its own
    ExitLock,
    Escape,
    /// Relative movement while locked, already scaled to container pixels
    LockedMove { delta: Point, bounds: Bounds },
    Hover { region: Option<String> },
    Dismiss,
    TouchStart { position: Point, target: TouchTarget },
    /// `magnifier_multiplier` converts finger pixels over the lens into
    /// container pixels of cursor travel
    TouchMove {
        position: Point,
        magnifier_multiplier: f64,
        bounds: Bounds,
    },
    PinchStart { a: Point, b: Point, current_zoom: f64 },
    PinchMove {
        a: Point,
        b: Point,
        min_zoom: f64,
        max_zoom: f64,
    },
    PinchEnd { remaining: Point },
    TouchEnd,
    TouchCancel,
}

/// Side effects requested by a transition, executed by the caller afterwards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    RequestPointerLock,
    ReleasePointerLock,
    /// Resolve the region at this container position and report it
    Select { at: Point },
    /// A pinch set the magnifier zoom
    ZoomChanged { zoom: f64 },
    Dismissed,
    CancelTimers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_input_assigns_ids() {
        let input = TouchInput::new(
            TouchPhase::Start,
            TouchTarget::Map,
            &[Point::new(1.0, 1.0), Point::new(2.0, 2.0)],
        );
        assert_eq!(input.touches.len(), 2);
        assert_eq!(input.touches[1].id, 1);
    }
}
