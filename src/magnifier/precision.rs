//! Precision mode: cursor dampening, the fading grid cue and the pointer lock offer.
//!
//! Everything keys off the screen pixel ratio, the number of magnifier pixels
//! one main-map pixel of cursor movement sweeps across. Once a single mouse
//! pixel jumps more than `threshold` magnified pixels, absolute positioning is
//! no longer precise enough.

use crate::core::{
    config::PrecisionConfig, geo::Point, lens::MagnifierLens, viewport::ViewportDescriptor,
};
use instant::{Duration, Instant};
use serde::Serialize;

/// Magnifier pixels per main-map pixel
pub fn screen_pixel_ratio(magnifier_scale: f64, viewport_scale: f64) -> f64 {
    if viewport_scale > 0.0 && viewport_scale.is_finite() {
        magnifier_scale / viewport_scale
    } else {
        magnifier_scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrecisionZone {
    Normal,
    /// Inside the fade band below the threshold
    Approaching,
    Precision,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecisionAssessment {
    pub screen_pixel_ratio: f64,
    pub zone: PrecisionZone,
    pub grid_opacity: f64,
    /// Fraction of raw movement applied to the cursor (1.0 = undampened)
    pub movement_multiplier: f64,
    pub offer_lock: bool,
    /// A fast movement cancelled dampening and the lock offer
    pub escaping: bool,
}

/// Auto-hiding "activate precision mode" hint
#[derive(Debug, Clone, Default)]
pub struct PrecisionHint {
    shown_at: Option<Instant>,
    expired: bool,
}

impl PrecisionHint {
    fn show(&mut self, now: Instant) {
        if self.shown_at.is_none() && !self.expired {
            self.shown_at = Some(now);
        }
    }

    fn cancel(&mut self) {
        self.shown_at = None;
        self.expired = false;
    }

    fn expire(&mut self, now: Instant, timeout: Duration) {
        if let Some(shown_at) = self.shown_at {
            if now.saturating_duration_since(shown_at) >= timeout {
                self.shown_at = None;
                self.expired = true;
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.shown_at.is_some()
    }
}

/// Result of feeding one raw pointer sample through the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampenedMove {
    pub assessment: PrecisionAssessment,
    /// Raw pointer movement since the previous sample
    pub raw_delta: Point,
}

impl DampenedMove {
    /// Moves `cursor` by the dampened delta
    pub fn apply(&self, cursor: Point) -> Point {
        cursor.add(&self.raw_delta.multiply(self.assessment.movement_multiplier))
    }
}

#[derive(Debug, Clone)]
pub struct PrecisionController {
    config: PrecisionConfig,
    hint: PrecisionHint,
    last_sample: Option<(Point, Instant)>,
}

impl PrecisionController {
    pub fn new(config: PrecisionConfig) -> Self {
        Self {
            config,
            hint: PrecisionHint::default(),
            last_sample: None,
        }
    }

    pub fn config(&self) -> &PrecisionConfig {
        &self.config
    }

    /// Grid cue opacity: 1 at the threshold, fading linearly to 0 at the band edges
    pub fn grid_opacity(&self, ratio: f64) -> f64 {
        let threshold = self.config.threshold;
        let band = threshold * self.config.fade_band;
        if !ratio.is_finite() || band <= 0.0 {
            return 0.0;
        }
        (1.0 - (ratio - threshold).abs() / band).clamp(0.0, 1.0)
    }

    /// Movement multiplier at or above the threshold; `None` below it.
    ///
    /// Right at the threshold movement keeps `max_dampening`; it tightens
    /// towards `min_dampening` as density grows.
    pub fn dampening(&self, ratio: f64) -> Option<f64> {
        if !(ratio >= self.config.threshold) {
            return None;
        }
        let multiplier = self.config.max_dampening * self.config.threshold / ratio;
        Some(multiplier.clamp(self.config.min_dampening, self.config.max_dampening))
    }

    /// Pure assessment for a ratio and the current cursor speed (px/s)
    pub fn assess(&self, ratio: f64, speed: f64) -> PrecisionAssessment {
        let threshold = self.config.threshold;
        let zone = if ratio >= threshold {
            PrecisionZone::Precision
        } else if ratio >= threshold * (1.0 - self.config.fade_band) {
            PrecisionZone::Approaching
        } else {
            PrecisionZone::Normal
        };

        let escaping = speed > self.config.escape_velocity_px_per_s;
        let dampening = if escaping { None } else { self.dampening(ratio) };

        PrecisionAssessment {
            screen_pixel_ratio: ratio,
            zone,
            grid_opacity: self.grid_opacity(ratio),
            movement_multiplier: dampening.unwrap_or(1.0),
            offer_lock: dampening.is_some() && self.config.pointer_lock_enabled,
            escaping,
        }
    }

    /// Feeds a raw pointer sample (container coordinates).
    ///
    /// Tracks speed between samples and shows or cancels the hint as the lock
    /// offer comes and goes.
    pub fn observe(&mut self, raw: Point, now: Instant, ratio: f64) -> DampenedMove {
        let (raw_delta, speed) = match self.last_sample {
            Some((previous, at)) => {
                let delta = raw.subtract(&previous);
                let elapsed = now
                    .saturating_duration_since(at)
                    .max(Duration::from_millis(1))
                    .as_secs_f64();
                (delta, delta.length() / elapsed)
            }
            None => (Point::default(), 0.0),
        };
        self.last_sample = Some((raw, now));

        let assessment = self.assess(ratio, speed);
        if assessment.escaping {
            log::debug!("fast movement ({speed:.0} px/s) cancelled precision dampening");
        }
        if assessment.offer_lock {
            self.hint.show(now);
        } else {
            self.hint.cancel();
        }

        DampenedMove {
            assessment,
            raw_delta,
        }
    }

    /// Zoom at which the screen pixel ratio reaches the threshold
    pub fn precision_floor_zoom(&self, lens: &MagnifierLens, viewport: &ViewportDescriptor) -> f64 {
        let ratio_at_one = screen_pixel_ratio(lens.scale(1.0, &viewport.content), viewport.scale());
        if ratio_at_one > 0.0 && ratio_at_one.is_finite() {
            self.config.threshold / ratio_at_one
        } else {
            1.0
        }
    }

    /// Expires the hint; driven by the render clock
    pub fn tick(&mut self, now: Instant) {
        self.hint.expire(now, self.config.hint_timeout());
    }

    pub fn hint_visible(&self) -> bool {
        self.hint.is_visible()
    }

    /// Forgets the previous sample so the next one starts a fresh movement
    pub fn rebase(&mut self) {
        self.last_sample = None;
    }

    /// Drops the hint timer and movement history
    pub fn reset(&mut self) {
        self.hint.cancel();
        self.last_sample = None;
    }
}
