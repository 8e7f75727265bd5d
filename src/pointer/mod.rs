//! The precision pointer: binds detection, zoom search, scale probes, precision
//! mode and the interaction reducer into one object a UI shell drives.
//!
//! Every `handle_*` call takes a fresh [`ViewportDescriptor`] snapshot and uses
//! it for the whole event. When the element is not laid out yet the event is
//! dropped and the last known state stays in place.

pub mod debug;

use crate::{
    animation::spring::MagnifierAnimator,
    core::{
        bounds::Bounds,
        config::PointerOptions,
        constants::{PROXIMITY_COLD_UNITS, PROXIMITY_HOT_UNITS},
        geo::Point,
        lens::{touch_multiplier, MagnifierLens},
        viewport::ViewportDescriptor,
    },
    input::{
        events::{Effect, InteractionEvent, PointerAction, PointerInput, TouchInput, TouchPhase},
        gestures::{GestureContext, TouchGestureHandler},
        state::{reduce, DesktopPhase, InputMode, InteractionState},
    },
    magnifier::{
        detector::{DetectionResult, RegionDetector},
        precision::{screen_pixel_ratio, PrecisionAssessment, PrecisionController},
        probe::{ProbeLayout, ProbeMeasurement, ScaleMeasurer},
        zoom::{find_optimal_zoom, ZoomConstraints, ZoomSearchResult},
    },
    spatial::catalog::RegionCatalog,
};
use fxhash::FxHashSet;
use instant::{Duration, Instant};
use serde::Serialize;
use std::sync::Arc;

/// Selection callback type
pub type SelectCallback = Box<dyn Fn(&SelectedRegion) + Send + Sync>;

/// Cursor listener callback type
pub type CursorCallback = Box<dyn Fn(&CursorUpdate) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedRegion {
    pub id: String,
    pub name: String,
    /// Content-space point that was clicked or tapped
    pub at: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorPosition {
    /// Pixels from the map element's top-left corner
    pub container: Point,
    pub content: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorUpdate {
    pub cursor: CursorPosition,
    pub hovered_region: Option<String>,
    pub zoom: f64,
}

/// What the renderer needs to draw the magnifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnifierView {
    /// Content-space rectangle shown in the lens
    pub view_box: Bounds,
    pub zoom: f64,
    pub opacity: f64,
    pub cursor_container: Point,
    pub cursor_content: Point,
    pub hovered_region: Option<String>,
    pub grid_opacity: f64,
    pub precision_hint_visible: bool,
}

/// Hot/cold distance to the region the player is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProximityLevel {
    Hot,
    Warm,
    Cold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Proximity {
    pub level: ProximityLevel,
    /// Content units from the cursor to the prompt region outline
    pub distance: f64,
    /// 1.0 on the region, 0.0 at the cold radius and beyond
    pub warmth: f64,
}

impl Proximity {
    fn from_distance(distance: f64) -> Self {
        let level = if distance <= PROXIMITY_HOT_UNITS {
            ProximityLevel::Hot
        } else if distance >= PROXIMITY_COLD_UNITS {
            ProximityLevel::Cold
        } else {
            ProximityLevel::Warm
        };
        Self {
            level,
            distance,
            warmth: (1.0 - distance / PROXIMITY_COLD_UNITS).clamp(0.0, 1.0),
        }
    }
}

pub struct PrecisionPointer {
    options: PointerOptions,
    detector: RegionDetector,
    measurer: ScaleMeasurer,
    precision: PrecisionController,
    gestures: TouchGestureHandler,
    animator: MagnifierAnimator,
    state: InteractionState,
    found: FxHashSet<String>,
    prompt_region: Option<String>,
    /// Last laid-out snapshot, for queries between events
    viewport: Option<ViewportDescriptor>,
    /// Zoom pinned by a pinch until the magnifier is dismissed
    pinned_zoom: Option<f64>,
    /// Set when Escape closed the magnifier; cleared once the cursor leaves the zone
    zone_suppressed: bool,
    last_detection: DetectionResult,
    last_zoom_search: Option<ZoomSearchResult>,
    last_assessment: Option<PrecisionAssessment>,
    last_probe: Option<ProbeMeasurement>,
    on_select: Vec<SelectCallback>,
    on_cursor_update: Vec<CursorCallback>,
}

impl PrecisionPointer {
    pub fn new(catalog: Arc<RegionCatalog>, options: PointerOptions, mode: InputMode) -> Self {
        let min_zoom = options.zoom.min_zoom;
        Self {
            detector: RegionDetector::new(catalog, options.detection.clone()),
            measurer: ScaleMeasurer::new(options.probe.clone()),
            precision: PrecisionController::new(options.precision.clone()),
            gestures: TouchGestureHandler::new(options.gestures.clone()),
            animator: MagnifierAnimator::new(min_zoom, &options.animation),
            state: InteractionState::new(mode),
            found: FxHashSet::default(),
            prompt_region: None,
            viewport: None,
            pinned_zoom: None,
            zone_suppressed: false,
            last_detection: DetectionResult::default(),
            last_zoom_search: None,
            last_assessment: None,
            last_probe: None,
            on_select: Vec::new(),
            on_cursor_update: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &PointerOptions {
        &self.options
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Register a selection listener, called with the region under the cursor
    pub fn on_select<F>(&mut self, callback: F)
    where
        F: Fn(&SelectedRegion) + Send + Sync + 'static,
    {
        self.on_select.push(Box::new(callback));
    }

    /// Register a listener for cursor and hover changes
    pub fn on_cursor_update<F>(&mut self, callback: F)
    where
        F: Fn(&CursorUpdate) + Send + Sync + 'static,
    {
        self.on_cursor_update.push(Box::new(callback));
    }

    pub fn set_found_regions<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.found = ids.into_iter().collect();
    }

    pub fn mark_found(&mut self, id: impl Into<String>) {
        self.found.insert(id.into());
    }

    pub fn set_prompt_region(&mut self, id: Option<String>) {
        self.prompt_region = id;
    }

    /// Mouse input in screen coordinates
    pub fn handle_pointer(&mut self, input: PointerInput, viewport: &ViewportDescriptor) -> Vec<Effect> {
        self.handle_pointer_at(input, viewport, Instant::now())
    }

    /// Same as [`handle_pointer`](Self::handle_pointer) with an explicit timestamp
    pub fn handle_pointer_at(
        &mut self,
        input: PointerInput,
        viewport: &ViewportDescriptor,
        now: Instant,
    ) -> Vec<Effect> {
        if !self.accept_snapshot(viewport) {
            return Vec::new();
        }
        if self.state.is_pointer_locked() && input.action == PointerAction::Move {
            // Locked pointers report relative motion through handle_locked_motion
            return Vec::new();
        }

        let raw = viewport.screen_to_container(input.position);
        let mut effects = Vec::new();

        if input.action == PointerAction::Leave {
            effects.extend(self.dispatch(InteractionEvent::Dismiss, viewport));
            return effects;
        }

        let position = self.track_movement(raw, viewport, now);
        effects.extend(self.dispatch(InteractionEvent::PointerMove { position }, viewport));
        match input.action {
            PointerAction::Down => {
                effects.extend(self.dispatch(InteractionEvent::PointerDownOnMap { position }, viewport))
            }
            PointerAction::Up => {
                effects.extend(self.dispatch(InteractionEvent::PointerUp { position }, viewport))
            }
            PointerAction::Move | PointerAction::Leave => {}
        }

        effects.extend(self.refresh(viewport));
        effects
    }

    /// Relative mouse motion (movementX/Y) while the pointer is locked
    pub fn handle_locked_motion(&mut self, delta: Point, viewport: &ViewportDescriptor) -> Vec<Effect> {
        if !self.accept_snapshot(viewport) || !self.state.is_pointer_locked() {
            return Vec::new();
        }
        let assessment = self.precision.assess(self.screen_pixel_ratio(viewport), 0.0);
        self.last_assessment = Some(assessment);

        let mut effects = self.dispatch(
            InteractionEvent::LockedMove {
                delta: delta.multiply(assessment.movement_multiplier),
                bounds: viewport.container_rect(),
            },
            viewport,
        );
        effects.extend(self.refresh(viewport));
        effects
    }

    /// Touch input. `layout` reports where the renderer actually drew the scale
    /// probes; without it the calculated lens geometry stands in.
    pub fn handle_touch(
        &mut self,
        input: TouchInput,
        viewport: &ViewportDescriptor,
        layout: Option<&dyn ProbeLayout>,
    ) -> Vec<Effect> {
        if !self.accept_snapshot(viewport) {
            return Vec::new();
        }

        let zoom = self.animator.current_zoom();
        let lens = self.lens(viewport);
        let magnifier_multiplier = if input.phase == TouchPhase::Move && input.touches.len() == 1 {
            let anchor = self.cursor_content(viewport);
            let fallback = lens.scale(zoom, &viewport.content);
            let calculated = lens.placed(Point::default(), anchor, zoom, &viewport.content);
            let layout: &dyn ProbeLayout = match layout {
                Some(layout) => layout,
                None => &calculated,
            };
            let measurement = self.measurer.measure(anchor, layout, fallback);
            self.last_probe = Some(measurement);
            touch_multiplier(viewport.scale(), measurement.pixels_per_content_unit)
        } else {
            touch_multiplier(viewport.scale(), lens.scale(zoom, &viewport.content))
        };

        let ctx = GestureContext {
            viewport,
            magnifier_multiplier,
            current_zoom: zoom,
            min_zoom: self.options.zoom.min_zoom,
            max_zoom: self.options.zoom.max_zoom,
        };

        let mut effects = Vec::new();
        for event in self.gestures.translate(&input, &ctx) {
            effects.extend(self.dispatch(event, viewport));
        }
        effects.extend(self.refresh(viewport));
        effects
    }

    /// Asks for pointer lock; the shell answers with `lock_granted` or `lock_denied`
    pub fn request_lock(&mut self) -> Vec<Effect> {
        if !self.options.precision.pointer_lock_enabled {
            log::debug!("pointer lock disabled by configuration");
            return Vec::new();
        }
        self.dispatch_without_viewport(InteractionEvent::RequestLock)
    }

    pub fn lock_granted(&mut self) -> Vec<Effect> {
        let effects = self.dispatch_without_viewport(InteractionEvent::LockGranted);
        if self.state.is_pointer_locked() {
            self.precision.rebase();
            self.refresh_zoom_target();
        }
        effects
    }

    pub fn lock_denied(&mut self) -> Vec<Effect> {
        log::debug!("pointer lock denied");
        self.dispatch_without_viewport(InteractionEvent::LockDenied)
    }

    /// The platform dropped the lock without an escape key
    pub fn lock_lost(&mut self) -> Vec<Effect> {
        self.dispatch_without_viewport(InteractionEvent::ExitLock)
    }

    /// Leaves pointer lock, or closes the magnifier until the cursor moves
    /// away from the tiny regions that opened it
    pub fn escape(&mut self) -> Vec<Effect> {
        let closing = matches!(self.state.desktop_phase(), Some(DesktopPhase::MagnifierActive { .. }));
        let mut effects = self.dispatch_without_viewport(InteractionEvent::Escape);
        if closing && matches!(self.state.desktop_phase(), Some(DesktopPhase::Hovering)) {
            log::debug!("magnifier closed by escape");
            self.zone_suppressed = true;
        }
        if let Some(viewport) = self.viewport {
            effects.extend(self.refresh(&viewport));
        }
        effects
    }

    pub fn dismiss(&mut self) -> Vec<Effect> {
        self.dispatch_without_viewport(InteractionEvent::Dismiss)
    }

    /// Render clock: advances springs and expires the precision hint
    pub fn tick(&mut self, dt: Duration, now: Instant) {
        self.animator.tick(dt);
        self.precision.tick(now);
    }

    pub fn cursor(&self) -> Option<CursorPosition> {
        let viewport = self.viewport?;
        let container = self.state.cursor();
        Some(CursorPosition {
            container,
            content: viewport.container_to_content(container),
        })
    }

    pub fn hovered_region(&self) -> Option<&str> {
        self.state.hovered_region()
    }

    /// Zoom currently drawn by the magnifier
    pub fn current_zoom(&self) -> f64 {
        self.animator.current_zoom()
    }

    pub fn magnifier_view(&self) -> Option<MagnifierView> {
        let viewport = self.viewport?;
        let cursor = self.cursor()?;
        let zoom = self.animator.current_zoom();
        Some(MagnifierView {
            view_box: self.lens(&viewport).view_box(cursor.content, zoom, &viewport.content),
            zoom,
            opacity: self.animator.opacity(),
            cursor_container: cursor.container,
            cursor_content: cursor.content,
            hovered_region: self.state.hovered_region().map(str::to_string),
            grid_opacity: self.last_assessment.map_or(0.0, |a| a.grid_opacity),
            precision_hint_visible: self.precision.hint_visible(),
        })
    }

    /// Distance feedback towards the prompt region
    pub fn proximity(&self) -> Option<Proximity> {
        let prompt = self.prompt_region.as_deref()?;
        let region = self.detector.catalog().get(prompt)?;
        let cursor = self.cursor()?;
        Some(Proximity::from_distance(region.distance_to(&cursor.content)))
    }

    fn accept_snapshot(&mut self, viewport: &ViewportDescriptor) -> bool {
        if !viewport.is_laid_out() {
            log::trace!("viewport not laid out, skipping event");
            return false;
        }
        self.viewport = Some(*viewport);
        true
    }

    /// Magnifier overlay for this snapshot's element size
    fn lens(&self, viewport: &ViewportDescriptor) -> MagnifierLens {
        self.options.lens.lens(viewport)
    }

    fn cursor_content(&self, viewport: &ViewportDescriptor) -> Point {
        viewport.container_to_content(self.state.cursor())
    }

    fn screen_pixel_ratio(&self, viewport: &ViewportDescriptor) -> f64 {
        screen_pixel_ratio(
            self.lens(viewport).scale(self.animator.current_zoom(), &viewport.content),
            viewport.scale(),
        )
    }

    /// Applies precision dampening to a raw pointer position while the
    /// magnifier is up; elsewhere the cursor follows the pointer.
    fn track_movement(&mut self, raw: Point, viewport: &ViewportDescriptor, now: Instant) -> Point {
        if !self.state.is_magnifier_active() {
            self.precision.observe(raw, now, 0.0);
            self.last_assessment = None;
            return raw;
        }
        let movement = self.precision.observe(raw, now, self.screen_pixel_ratio(viewport));
        self.last_assessment = Some(movement.assessment);
        viewport
            .container_rect()
            .clamp(&movement.apply(self.state.cursor()))
    }

    fn dispatch_without_viewport(&mut self, event: InteractionEvent) -> Vec<Effect> {
        match self.viewport {
            Some(viewport) => self.dispatch(event, &viewport),
            None => {
                let transition = reduce(&self.state, &event, &self.options.gestures);
                self.state = transition.state;
                self.run_effects(&transition.effects, None);
                transition.effects
            }
        }
    }

    /// Runs the reducer, commits its state, then executes the effects
    fn dispatch(&mut self, event: InteractionEvent, viewport: &ViewportDescriptor) -> Vec<Effect> {
        let before = (self.state.cursor(), self.state.hovered_region().map(str::to_string));
        let transition = reduce(&self.state, &event, &self.options.gestures);
        if transition.changed_from(&self.state) {
            log::trace!("{} -> {}", self.state.phase_name(), transition.state.phase_name());
        }
        self.state = transition.state;
        self.run_effects(&transition.effects, Some(viewport));

        let after = (self.state.cursor(), self.state.hovered_region().map(str::to_string));
        if before != after && !self.state.is_idle() {
            self.notify_cursor(viewport);
        }
        transition.effects
    }

    fn run_effects(&mut self, effects: &[Effect], viewport: Option<&ViewportDescriptor>) {
        for effect in effects {
            match effect {
                Effect::Select { at } => {
                    if let Some(viewport) = viewport {
                        self.select_at(*at, viewport);
                    }
                }
                Effect::ZoomChanged { zoom } => {
                    self.pinned_zoom = Some(*zoom);
                    self.animator.jump_zoom(*zoom);
                }
                Effect::CancelTimers => self.precision.reset(),
                Effect::Dismissed => {
                    self.pinned_zoom = None;
                    self.zone_suppressed = false;
                    self.last_probe = None;
                    self.last_zoom_search = None;
                    self.last_assessment = None;
                    self.animator.hide();
                    self.animator.set_zoom_target(self.options.zoom.min_zoom);
                }
                Effect::RequestPointerLock | Effect::ReleasePointerLock => {}
            }
        }
    }

    fn select_at(&self, container: Point, viewport: &ViewportDescriptor) {
        let content = viewport.container_to_content(container);
        let detection = self.detector.detect_content(content, viewport, 1.0);
        let Some(id) = detection.region_under_cursor else {
            log::debug!("selection at {:?} hit no region", content);
            return;
        };
        let name = self.detector.catalog().name_of(&id).unwrap_or(&id).to_string();
        log::debug!("selected region {id} ({name})");

        let selected = SelectedRegion { id, name, at: content };
        for callback in &self.on_select {
            callback(&selected);
        }
    }

    fn notify_cursor(&self, viewport: &ViewportDescriptor) {
        if self.on_cursor_update.is_empty() {
            return;
        }
        let container = self.state.cursor();
        let update = CursorUpdate {
            cursor: CursorPosition {
                container,
                content: viewport.container_to_content(container),
            },
            hovered_region: self.state.hovered_region().map(str::to_string),
            zoom: self.animator.current_zoom(),
        };
        for callback in &self.on_cursor_update {
            callback(&update);
        }
    }

    /// Post-event pass: detection, magnifier zone, hover and zoom target
    fn refresh(&mut self, viewport: &ViewportDescriptor) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state.is_idle() {
            self.last_detection = DetectionResult::default();
            self.animator.hide();
            return effects;
        }

        let anchor = self.cursor_content(viewport);
        let detection = self.detector.detect_content(anchor, viewport, 1.0);

        if self.state.mode() == InputMode::Desktop {
            let near_tiny = detection.has_very_small_region();
            if !near_tiny {
                self.zone_suppressed = false;
            }
            // The magnifier stays up while a click inside it is in progress
            let zone_event = match (self.state.desktop_phase(), near_tiny) {
                (Some(DesktopPhase::Hovering), true) if !self.zone_suppressed => {
                    Some(InteractionEvent::EnterMagnifierZone)
                }
                (Some(DesktopPhase::MagnifierActive { press: None }), false) => {
                    Some(InteractionEvent::LeaveMagnifierZone)
                }
                _ => None,
            };
            if let Some(event) = zone_event {
                effects.extend(self.dispatch(event, viewport));
            }
        }

        if detection.region_under_cursor.as_deref() != self.state.hovered_region() {
            effects.extend(self.dispatch(
                InteractionEvent::Hover {
                    region: detection.region_under_cursor.clone(),
                },
                viewport,
            ));
        }

        self.last_detection = detection;
        if self.state.is_magnifier_active() {
            self.animator.show();
            self.refresh_zoom_target();
        } else {
            self.animator.hide();
            self.animator.set_zoom_target(self.options.zoom.min_zoom);
        }
        effects
    }

    fn refresh_zoom_target(&mut self) {
        if let Some(zoom) = self.pinned_zoom {
            self.animator.set_zoom_target(zoom);
            return;
        }
        let Some(viewport) = self.viewport else {
            return;
        };

        let floor = self
            .state
            .is_pointer_locked()
            .then(|| self.precision.precision_floor_zoom(&self.lens(&viewport), &viewport));
        let constraints = ZoomConstraints::from_config(&self.options.zoom)
            .with_found(&self.found)
            .with_precision_floor(floor);
        let result = find_optimal_zoom(
            &self.last_detection.detected_regions,
            self.cursor_content(&viewport),
            &viewport,
            &constraints,
        );
        self.animator.set_zoom_target(result.zoom);
        self.last_zoom_search = Some(result);
    }
}
