//! The interaction state machine.
//!
//! `reduce` is the only place where the phase, the cursor and the hovered
//! region change. It never performs side effects; anything the outside world
//! has to do (ask for pointer lock, report a selection) comes back as
//! [`Effect`] values in the [`Transition`].
//!
//! Cursor positions are container coordinates: pixels from the top-left corner
//! of the rendered map element.

use crate::{
    core::{bounds::Bounds, config::GestureConfig, geo::Point},
    input::{
        events::{Effect, InteractionEvent, TouchTarget},
        gestures::{classify_motion, pinch_zoom, MotionKind},
    },
};
use serde::{Deserialize, Serialize};

/// Which family of input drives the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    #[default]
    Desktop,
    Touch,
}

/// A mouse press being tracked until release
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PressTrack {
    pub start: Point,
    pub max_displacement: f64,
}

impl PressTrack {
    fn new(start: Point) -> Self {
        Self {
            start,
            max_displacement: 0.0,
        }
    }

    fn observe(&mut self, position: Point) {
        self.max_displacement = self.max_displacement.max(self.start.distance_to(&position));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DesktopPhase {
    Idle,
    Hovering,
    DraggingMap(PressTrack),
    MagnifierActive { press: Option<PressTrack> },
    /// Waiting for the platform to answer a lock request
    LockRequested,
    PointerLocked,
}

/// A single finger being tracked until it lifts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TouchTrack {
    pub target: TouchTarget,
    pub start: Point,
    pub last: Point,
    pub max_displacement: f64,
    /// Cleared when the finger is what remains of a pinch
    pub tap_eligible: bool,
}

impl TouchTrack {
    fn new(target: TouchTarget, start: Point) -> Self {
        Self {
            target,
            start,
            last: start,
            max_displacement: 0.0,
            tap_eligible: true,
        }
    }

    fn after_pinch(position: Point) -> Self {
        Self {
            tap_eligible: false,
            ..Self::new(TouchTarget::Magnifier, position)
        }
    }

    fn is_tap(&self, threshold: f64) -> bool {
        self.tap_eligible && classify_motion(self.max_displacement, threshold) == MotionKind::Tap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PinchTrack {
    pub start_distance: f64,
    pub start_zoom: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MobilePhase {
    Idle,
    MagnifierActive { touch: Option<TouchTrack> },
    MagnifierPanning(TouchTrack),
    MagnifierPinching(PinchTrack),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesktopState {
    pub phase: DesktopPhase,
    /// Container coordinates
    pub cursor: Point,
    pub hovered_region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobileState {
    pub phase: MobilePhase,
    /// Container coordinates
    pub cursor: Point,
    pub hovered_region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InteractionState {
    Desktop(DesktopState),
    Mobile(MobileState),
}

impl InteractionState {
    pub fn new(mode: InputMode) -> Self {
        match mode {
            InputMode::Desktop => InteractionState::Desktop(DesktopState {
                phase: DesktopPhase::Idle,
                cursor: Point::default(),
                hovered_region: None,
            }),
            InputMode::Touch => InteractionState::Mobile(MobileState {
                phase: MobilePhase::Idle,
                cursor: Point::default(),
                hovered_region: None,
            }),
        }
    }

    pub fn mode(&self) -> InputMode {
        match self {
            InteractionState::Desktop(_) => InputMode::Desktop,
            InteractionState::Mobile(_) => InputMode::Touch,
        }
    }

    pub fn cursor(&self) -> Point {
        match self {
            InteractionState::Desktop(state) => state.cursor,
            InteractionState::Mobile(state) => state.cursor,
        }
    }

    pub fn hovered_region(&self) -> Option<&str> {
        match self {
            InteractionState::Desktop(state) => state.hovered_region.as_deref(),
            InteractionState::Mobile(state) => state.hovered_region.as_deref(),
        }
    }

    pub fn desktop_phase(&self) -> Option<&DesktopPhase> {
        match self {
            InteractionState::Desktop(state) => Some(&state.phase),
            InteractionState::Mobile(_) => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(
            self,
            InteractionState::Desktop(DesktopState {
                phase: DesktopPhase::Idle,
                ..
            }) | InteractionState::Mobile(MobileState {
                phase: MobilePhase::Idle,
                ..
            })
        )
    }

    /// The magnifier overlay should be visible
    pub fn is_magnifier_active(&self) -> bool {
        match self {
            InteractionState::Desktop(state) => matches!(
                state.phase,
                DesktopPhase::MagnifierActive { .. }
                    | DesktopPhase::LockRequested
                    | DesktopPhase::PointerLocked
            ),
            InteractionState::Mobile(state) => state.phase != MobilePhase::Idle,
        }
    }

    pub fn is_pointer_locked(&self) -> bool {
        matches!(
            self,
            InteractionState::Desktop(DesktopState {
                phase: DesktopPhase::PointerLocked,
                ..
            })
        )
    }

    pub fn is_pinching(&self) -> bool {
        matches!(
            self,
            InteractionState::Mobile(MobileState {
                phase: MobilePhase::MagnifierPinching(_),
                ..
            })
        )
    }

    /// Zoom set by an ongoing pinch
    pub fn pinch_zoom(&self) -> Option<f64> {
        match self {
            InteractionState::Mobile(MobileState {
                phase: MobilePhase::MagnifierPinching(pinch),
                ..
            }) => Some(pinch.zoom),
            _ => None,
        }
    }

    pub fn phase_name(&self) -> &'static str {
        match self {
            InteractionState::Desktop(state) => match state.phase {
                DesktopPhase::Idle => "idle",
                DesktopPhase::Hovering => "hovering",
                DesktopPhase::DraggingMap(_) => "dragging_map",
                DesktopPhase::MagnifierActive { .. } => "magnifier_active",
                DesktopPhase::LockRequested => "lock_requested",
                DesktopPhase::PointerLocked => "pointer_locked",
            },
            InteractionState::Mobile(state) => match state.phase {
                MobilePhase::Idle => "idle",
                MobilePhase::MagnifierActive { .. } => "magnifier_active",
                MobilePhase::MagnifierPanning(_) => "magnifier_panning",
                MobilePhase::MagnifierPinching(_) => "magnifier_pinching",
            },
        }
    }
}

/// Next state plus the effects to run once it is committed
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: InteractionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &InteractionState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    pub fn changed_from(&self, previous: &InteractionState) -> bool {
        &self.state != previous
    }
}

/// Computes the next state for `event`. Events a phase does not handle leave
/// the state untouched and produce no effects.
pub fn reduce(state: &InteractionState, event: &InteractionEvent, config: &GestureConfig) -> Transition {
    let transition = match state {
        InteractionState::Desktop(desktop) => reduce_desktop(desktop, event, config)
            .map(|(next, effects)| Transition {
                state: InteractionState::Desktop(next),
                effects,
            }),
        InteractionState::Mobile(mobile) => reduce_mobile(mobile, event, config)
            .map(|(next, effects)| Transition {
                state: InteractionState::Mobile(next),
                effects,
            }),
    };

    transition.unwrap_or_else(|| {
        log::trace!("{:?} ignored in phase {}", event, state.phase_name());
        Transition::unchanged(state)
    })
}

fn dismiss_effects(lock_held: bool) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(3);
    if lock_held {
        effects.push(Effect::ReleasePointerLock);
    }
    effects.push(Effect::Dismissed);
    effects.push(Effect::CancelTimers);
    effects
}

fn reduce_desktop(
    state: &DesktopState,
    event: &InteractionEvent,
    config: &GestureConfig,
) -> Option<(DesktopState, Vec<Effect>)> {
    use DesktopPhase as P;
    use InteractionEvent as E;

    let mut next = state.clone();
    let mut effects = Vec::new();

    match (&state.phase, event) {
        (P::Idle, E::PointerMove { position }) => {
            next.phase = P::Hovering;
            next.cursor = *position;
        }
        (P::Hovering, E::PointerMove { position }) => next.cursor = *position,
        (P::Hovering, E::PointerDownOnMap { position }) => {
            next.phase = P::DraggingMap(PressTrack::new(*position));
            next.cursor = *position;
        }
        (P::Hovering, E::EnterMagnifierZone) => next.phase = P::MagnifierActive { press: None },
        (P::DraggingMap(press), E::PointerMove { position }) => {
            let mut press = *press;
            press.observe(*position);
            next.phase = P::DraggingMap(press);
            next.cursor = *position;
        }
        (P::DraggingMap(press), E::PointerUp { position }) => {
            let mut press = *press;
            press.observe(*position);
            next.phase = P::Hovering;
            next.cursor = *position;
            if classify_motion(press.max_displacement, config.tap_threshold_px) == MotionKind::Tap {
                effects.push(Effect::Select { at: *position });
            }
        }
        // Inside the magnifier `position` is the dampened cursor and clicks act on
        // the cursor, not on the raw pointer
        (P::MagnifierActive { press }, E::PointerMove { position }) => {
            next.cursor = *position;
            if let Some(press) = press {
                let mut press = *press;
                press.observe(*position);
                next.phase = P::MagnifierActive { press: Some(press) };
            }
        }
        (P::MagnifierActive { .. }, E::PointerDownOnMap { .. }) => {
            next.phase = P::MagnifierActive {
                press: Some(PressTrack::new(state.cursor)),
            };
        }
        (P::MagnifierActive { press: Some(press) }, E::PointerUp { .. }) => {
            let mut press = *press;
            press.observe(state.cursor);
            next.phase = P::MagnifierActive { press: None };
            if classify_motion(press.max_displacement, config.tap_threshold_px) == MotionKind::Tap {
                effects.push(Effect::Select { at: state.cursor });
            }
        }
        (P::MagnifierActive { .. }, E::LeaveMagnifierZone | E::Escape) => next.phase = P::Hovering,
        (P::MagnifierActive { .. }, E::RequestLock) => {
            next.phase = P::LockRequested;
            effects.push(Effect::RequestPointerLock);
        }
        (P::LockRequested, E::LockGranted) => next.phase = P::PointerLocked,
        (P::LockRequested, E::LockDenied) => next.phase = P::MagnifierActive { press: None },
        (P::LockRequested, E::Escape) => {
            next.phase = P::MagnifierActive { press: None };
            effects.push(Effect::ReleasePointerLock);
        }
        (P::PointerLocked, E::LockedMove { delta, bounds }) => {
            next.cursor = clamp_cursor(state.cursor.add(delta), bounds);
        }
        (P::PointerLocked, E::PointerDownOnMap { .. }) => {
            effects.push(Effect::Select { at: state.cursor });
        }
        (P::PointerLocked, E::ExitLock) => next.phase = P::MagnifierActive { press: None },
        (P::PointerLocked, E::Escape) => {
            next.phase = P::MagnifierActive { press: None };
            effects.push(Effect::ReleasePointerLock);
        }
        (P::Idle, E::Hover { .. }) => return None,
        (_, E::Hover { region }) => next.hovered_region = region.clone(),
        (P::Idle, E::Dismiss) => return None,
        (phase, E::Dismiss) => {
            let lock_held = matches!(phase, P::LockRequested | P::PointerLocked);
            next = DesktopState {
                phase: P::Idle,
                cursor: state.cursor,
                hovered_region: None,
            };
            effects = dismiss_effects(lock_held);
        }
        _ => return None,
    }

    Some((next, effects))
}

fn reduce_mobile(
    state: &MobileState,
    event: &InteractionEvent,
    config: &GestureConfig,
) -> Option<(MobileState, Vec<Effect>)> {
    use InteractionEvent as E;
    use MobilePhase as P;

    let mut next = state.clone();
    let mut effects = Vec::new();

    match (&state.phase, event) {
        (P::Idle, E::TouchStart { position, .. }) => {
            // Nothing is magnified yet, so every first touch lands on the map
            next.phase = P::MagnifierActive {
                touch: Some(TouchTrack::new(TouchTarget::Map, *position)),
            };
            next.cursor = *position;
        }
        (P::MagnifierActive { .. } | P::MagnifierPanning(_), E::TouchStart { position, target }) => {
            next.phase = P::MagnifierActive {
                touch: Some(TouchTrack::new(*target, *position)),
            };
        }
        (
            P::MagnifierActive { touch: Some(track) } | P::MagnifierPanning(track),
            E::TouchMove {
                position,
                magnifier_multiplier,
                bounds,
            },
        ) => {
            let mut track = *track;
            let delta = position.subtract(&track.last);
            // Dragging the lens drags the content, so the cursor runs the other way
            let pan_scale = match track.target {
                TouchTarget::Map => 1.0,
                TouchTarget::Magnifier => -magnifier_multiplier,
            };
            next.cursor = clamp_cursor(state.cursor.add(&delta.multiply(pan_scale)), bounds);
            track.last = *position;
            track.max_displacement = track.max_displacement.max(track.start.distance_to(position));
            next.phase = P::MagnifierPanning(track);
        }
        (
            P::MagnifierActive { .. } | P::MagnifierPanning(_) | P::MagnifierPinching(_),
            E::PinchStart { a, b, current_zoom },
        ) => {
            next.phase = P::MagnifierPinching(PinchTrack {
                start_distance: a.distance_to(b).max(config.min_pinch_distance_px),
                start_zoom: *current_zoom,
                zoom: *current_zoom,
            });
        }
        (
            P::MagnifierPinching(pinch),
            E::PinchMove {
                a,
                b,
                min_zoom,
                max_zoom,
            },
        ) => {
            let zoom = pinch_zoom(
                pinch.start_distance,
                pinch.start_zoom,
                a.distance_to(b),
                *min_zoom,
                *max_zoom,
                config.min_pinch_distance_px,
            );
            next.phase = P::MagnifierPinching(PinchTrack { zoom, ..*pinch });
            effects.push(Effect::ZoomChanged { zoom });
        }
        (P::MagnifierPinching(_), E::PinchEnd { remaining }) => {
            next.phase = P::MagnifierPanning(TouchTrack::after_pinch(*remaining));
        }
        (P::MagnifierActive { touch }, E::TouchEnd) => {
            next.phase = P::MagnifierActive { touch: None };
            if let Some(track) = touch {
                finish_touch(track, config, &mut next, &mut effects);
            }
        }
        (P::MagnifierPanning(track), E::TouchEnd) => {
            next.phase = P::MagnifierActive { touch: None };
            finish_touch(track, config, &mut next, &mut effects);
        }
        (P::MagnifierPinching(_), E::TouchEnd) => next.phase = P::MagnifierActive { touch: None },
        (P::Idle, E::TouchEnd | E::TouchCancel) => return None,
        (_, E::TouchCancel) => next.phase = P::MagnifierActive { touch: None },
        (P::Idle, E::Hover { .. }) => return None,
        (_, E::Hover { region }) => next.hovered_region = region.clone(),
        (P::Idle, E::Dismiss) => return None,
        (_, E::Dismiss) => {
            next = MobileState {
                phase: P::Idle,
                cursor: state.cursor,
                hovered_region: None,
            };
            effects = dismiss_effects(false);
        }
        _ => return None,
    }

    Some((next, effects))
}

/// Taps on the lens select what the cursor is on; taps on the map move the cursor there
fn finish_touch(track: &TouchTrack, config: &GestureConfig, next: &mut MobileState, effects: &mut Vec<Effect>) {
    if !track.is_tap(config.tap_threshold_px) {
        return;
    }
    match track.target {
        TouchTarget::Magnifier => effects.push(Effect::Select { at: next.cursor }),
        TouchTarget::Map => next.cursor = track.start,
    }
}

fn clamp_cursor(cursor: Point, bounds: &Bounds) -> Point {
    if bounds.is_degenerate() {
        cursor
    } else {
        bounds.clamp(&cursor)
    }
}
