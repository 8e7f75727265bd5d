//! Render-clock smoothing for the magnifier.
//!
//! Targets come from the interaction layer; the animator only turns them into
//! per-frame values. Nothing here feeds back into the interaction phase.

use crate::animation::interpolation::{EasingFunction, Interpolatable};
use crate::core::config::AnimationConfig;
use instant::Duration;

/// Largest integration step; longer frames are split
const MAX_STEP_SECS: f64 = 1.0 / 120.0;

/// Damped spring chasing a target value
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    rest_epsilon: f64,
}

impl Spring {
    pub fn new(value: f64, config: &AnimationConfig) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            stiffness: config.stiffness,
            damping: config.damping,
            rest_epsilon: config.rest_epsilon,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Jumps straight to `value` and stops
    pub fn snap_to(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value;
            self.target = value;
            self.velocity = 0.0;
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Advances the spring by `dt`, semi-implicit Euler in small steps
    pub fn tick(&mut self, dt: Duration) -> f64 {
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 && !self.is_at_rest() {
            let step = remaining.min(MAX_STEP_SECS);
            let force = self.stiffness * (self.target - self.value) - self.damping * self.velocity;
            self.velocity += force * step;
            self.value += self.velocity * step;
            remaining -= step;

            let scale = self.target.abs().max(1.0);
            if (self.target - self.value).abs() < self.rest_epsilon * scale
                && self.velocity.abs() < self.rest_epsilon * scale
            {
                self.value = self.target;
                self.velocity = 0.0;
            }
        }
        self.value
    }
}

/// Fixed-duration eased transition between two values
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T: Interpolatable + Clone> {
    from: T,
    to: T,
    current: T,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFunction,
}

impl<T: Interpolatable + Clone> Tween<T> {
    pub fn settled(value: T, duration: Duration, easing: EasingFunction) -> Self {
        Self {
            from: value.clone(),
            to: value.clone(),
            current: value,
            elapsed: duration,
            duration,
            easing,
        }
    }

    /// Starts a new transition from wherever the value currently is
    pub fn retarget(&mut self, to: T) {
        self.from = self.current.clone();
        self.to = to;
        self.elapsed = Duration::ZERO;
    }

    pub fn value(&self) -> &T {
        &self.current
    }

    pub fn target(&self) -> &T {
        &self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn advance(&mut self, dt: Duration) -> &T {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
        };
        self.current = self.from.lerp(&self.to, self.easing.apply(progress));
        &self.current
    }
}

/// Zoom spring plus fade for the magnifier overlay
#[derive(Debug, Clone)]
pub struct MagnifierAnimator {
    zoom: Spring,
    opacity: Tween<f64>,
}

impl MagnifierAnimator {
    pub fn new(initial_zoom: f64, config: &AnimationConfig) -> Self {
        Self {
            zoom: Spring::new(initial_zoom, config),
            opacity: Tween::settled(0.0, config.fade_duration(), EasingFunction::EaseOutCubic),
        }
    }

    pub fn set_zoom_target(&mut self, zoom: f64) {
        self.zoom.set_target(zoom);
    }

    /// Pinch zoom follows the fingers directly
    pub fn jump_zoom(&mut self, zoom: f64) {
        self.zoom.snap_to(zoom);
    }

    pub fn show(&mut self) {
        if *self.opacity.target() != 1.0 {
            self.opacity.retarget(1.0);
        }
    }

    pub fn hide(&mut self) {
        if *self.opacity.target() != 0.0 {
            self.opacity.retarget(0.0);
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        self.zoom.tick(dt);
        self.opacity.advance(dt);
    }

    /// Zoom as currently drawn; the value selection math reads back
    pub fn current_zoom(&self) -> f64 {
        self.zoom.value()
    }

    pub fn target_zoom(&self) -> f64 {
        self.zoom.target()
    }

    pub fn opacity(&self) -> f64 {
        *self.opacity.value()
    }

    pub fn is_settled(&self) -> bool {
        self.zoom.is_at_rest() && self.opacity.is_finished()
    }
}
