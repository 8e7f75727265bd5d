//! Configuration system for pointer behavior tuning
//!
//! This module provides a hierarchical configuration system that allows users
//! to configure detection, zoom search, precision mode, gestures and animation
//! through presets or custom configurations. Every section can be loaded from
//! JSON so a UI shell can ship its tuning next to its map data.

use crate::core::constants::*;
use crate::core::{lens::MagnifierLens, viewport::ViewportDescriptor};
use crate::{PointerError, Result};
use instant::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointerProfile {
    /// Mouse and trackpad: precision mode and pointer lock enabled
    #[default]
    Desktop,
    /// Fingers: larger lens, no pointer lock, more generous detection
    Touch,
    Custom(PointerOptions),
}

impl PointerProfile {
    pub fn resolve(&self) -> PointerOptions {
        match self {
            Self::Desktop => PointerOptions::default(),
            Self::Touch => PointerOptions {
                detection: DetectionConfig {
                    radius_px: DETECTION_RADIUS_PX * 1.6,
                    ..DetectionConfig::default()
                },
                precision: PrecisionConfig {
                    pointer_lock_enabled: false,
                    ..PrecisionConfig::default()
                },
                lens: LensConfig {
                    width: 260.0,
                    height: 260.0,
                    ..LensConfig::default()
                },
                ..PointerOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PointerOptions {
    pub detection: DetectionConfig,
    pub zoom: ZoomConfig,
    pub precision: PrecisionConfig,
    pub gestures: GestureConfig,
    pub lens: LensConfig,
    pub probe: ProbeConfig,
    pub animation: AnimationConfig,
}

impl PointerOptions {
    /// Parses options from JSON; missing sections and fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: PointerOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects combinations that would break the zoom or precision math
    pub fn validate(&self) -> Result<()> {
        let zoom = &self.zoom;
        if !(zoom.min_zoom > 0.0 && zoom.min_zoom <= zoom.max_zoom && zoom.max_zoom.is_finite()) {
            return Err(PointerError::InvalidConfig(format!(
                "zoom range [{}, {}] must be positive and ordered",
                zoom.min_zoom, zoom.max_zoom
            )));
        }
        if zoom.target_screen_size_px <= 0.0 {
            return Err(PointerError::InvalidConfig(
                "target_screen_size_px must be positive".to_string(),
            ));
        }
        let precision = &self.precision;
        if precision.threshold <= 0.0 || !(0.0..1.0).contains(&precision.fade_band) {
            return Err(PointerError::InvalidConfig(format!(
                "precision threshold {} / fade band {} out of range",
                precision.threshold, precision.fade_band
            )));
        }
        if !(0.0 < precision.min_dampening && precision.min_dampening <= precision.max_dampening)
            || precision.max_dampening > 1.0
        {
            return Err(PointerError::InvalidConfig(format!(
                "dampening range [{}, {}] must sit inside (0, 1]",
                precision.min_dampening, precision.max_dampening
            )));
        }
        if self.lens.width <= 0.0 || self.lens.height <= 0.0 {
            return Err(PointerError::InvalidConfig("lens must have a size".to_string()));
        }
        if !(self.lens.min_fraction > 0.0 && self.lens.min_fraction <= 1.0) {
            return Err(PointerError::InvalidConfig(format!(
                "lens min_fraction {} must sit inside (0, 1]",
                self.lens.min_fraction
            )));
        }
        // The pointer-lock floor zoom is at most threshold / min_fraction
        let worst_floor = precision.threshold / self.lens.min_fraction;
        if worst_floor > zoom.max_zoom {
            return Err(PointerError::InvalidConfig(format!(
                "max_zoom {} cannot reach the precision threshold (needs up to {:.1})",
                zoom.max_zoom, worst_floor
            )));
        }
        if self.animation.stiffness <= 0.0 || self.animation.damping < 0.0 {
            return Err(PointerError::InvalidConfig(
                "spring stiffness must be positive and damping non-negative".to_string(),
            ));
        }
        if self.probe.separation_units <= 0.0 {
            return Err(PointerError::InvalidConfig(
                "probe separation must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Candidate search radius around the cursor at zoom 1, in screen pixels
    pub radius_px: f64,
    pub very_small_area_px2: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            radius_px: DETECTION_RADIUS_PX,
            very_small_area_px2: VERY_SMALL_AREA_PX2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub target_screen_size_px: f64,
    pub found_suppression: f64,
    pub distance_falloff_px: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            target_screen_size_px: TARGET_SCREEN_SIZE_PX,
            found_suppression: FOUND_REGION_SUPPRESSION,
            distance_falloff_px: IMPORTANCE_DISTANCE_FALLOFF_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionConfig {
    pub threshold: f64,
    pub fade_band: f64,
    pub max_dampening: f64,
    pub min_dampening: f64,
    pub escape_velocity_px_per_s: f64,
    pub hint_timeout_ms: u64,
    pub pointer_lock_enabled: bool,
}

impl PrecisionConfig {
    pub fn hint_timeout(&self) -> Duration {
        Duration::from_millis(self.hint_timeout_ms)
    }
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            threshold: PRECISION_MODE_THRESHOLD,
            fade_band: PRECISION_FADE_BAND,
            max_dampening: MAX_DAMPENING_MULTIPLIER,
            min_dampening: MIN_DAMPENING_MULTIPLIER,
            escape_velocity_px_per_s: ESCAPE_VELOCITY_PX_PER_S,
            hint_timeout_ms: PRECISION_HINT_TIMEOUT_MS,
            pointer_lock_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Cumulative displacement up to which a press or touch is a tap
    pub tap_threshold_px: f64,
    pub min_pinch_distance_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_threshold_px: TAP_MOVEMENT_THRESHOLD_PX,
            min_pinch_distance_px: MIN_PINCH_DISTANCE_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Minimum overlay width in pixels
    pub width: f64,
    /// Minimum overlay height in pixels
    pub height: f64,
    /// The overlay also covers at least this share of the map element per axis
    pub min_fraction: f64,
}

impl LensConfig {
    /// Overlay size for the element in `viewport`, derived per snapshot
    pub fn lens(&self, viewport: &ViewportDescriptor) -> MagnifierLens {
        let element = &viewport.element;
        MagnifierLens::new(
            self.width.max(element.width() * self.min_fraction),
            self.height.max(element.height() * self.min_fraction),
        )
    }
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_LENS_SIZE.0,
            height: DEFAULT_LENS_SIZE.1,
            min_fraction: MIN_LENS_FRACTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub separation_units: f64,
    pub min_distance_px: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            separation_units: PROBE_SEPARATION_UNITS,
            min_distance_px: MIN_PROBE_DISTANCE_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub stiffness: f64,
    pub damping: f64,
    /// Springs snap to their target once both offset and velocity fall below this
    pub rest_epsilon: f64,
    /// Magnifier fade in/out
    pub fade_ms: u64,
}

impl AnimationConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            stiffness: 170.0,
            damping: 26.0,
            rest_epsilon: 0.001,
            fade_ms: 150,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_resolve() {
        let desktop = PointerProfile::Desktop.resolve();
        assert!(desktop.precision.pointer_lock_enabled);
        assert_eq!(desktop.zoom.max_zoom, DEFAULT_MAX_ZOOM);

        let touch = PointerProfile::Touch.resolve();
        assert!(!touch.precision.pointer_lock_enabled);
        assert!(touch.detection.radius_px > desktop.detection.radius_px);

        let mut custom = PointerOptions::default();
        custom.zoom.max_zoom = 120.0;
        assert_eq!(PointerProfile::Custom(custom.clone()).resolve(), custom);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = PointerOptions::from_json(r#"{"zoom": {"max_zoom": 250.0}}"#).unwrap();
        assert_eq!(options.zoom.max_zoom, 250.0);
        assert_eq!(options.zoom.min_zoom, DEFAULT_MIN_ZOOM);
        assert_eq!(options.precision, PrecisionConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let options = PointerProfile::Touch.resolve();
        let json = options.to_json().unwrap();
        assert_eq!(PointerOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        assert!(PointerOptions::from_json(r#"{"zoom": {"min_zoom": 10.0, "max_zoom": 5.0}}"#).is_err());
        assert!(PointerOptions::from_json(r#"{"precision": {"fade_band": 1.5}}"#).is_err());
        assert!(PointerOptions::from_json(r#"{"lens": {"width": 0.0}}"#).is_err());
        assert!(PointerOptions::from_json(r#"{"lens": {"min_fraction": 0.0}}"#).is_err());
        // 20 / 0.4 needs zoom 50
        assert!(PointerOptions::from_json(r#"{"zoom": {"max_zoom": 40.0}}"#).is_err());
        assert!(PointerOptions::from_json("not json").is_err());
    }

    #[test]
    fn test_lens_grows_with_the_element() {
        let config = LensConfig::default();
        let small = ViewportDescriptor::new(
            crate::core::bounds::Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0),
            crate::core::bounds::Bounds::from_xywh(0.0, 0.0, 500.0, 250.0),
        );
        assert_eq!(config.lens(&small), MagnifierLens::new(300.0, 200.0));

        let wide = ViewportDescriptor::new(
            crate::core::bounds::Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0),
            crate::core::bounds::Bounds::from_xywh(0.0, 0.0, 2000.0, 1000.0),
        );
        assert_eq!(config.lens(&wide), MagnifierLens::new(800.0, 400.0));
    }

    #[test]
    fn test_defaults_reach_precision_threshold() {
        let options = PointerOptions::default();
        options.validate().unwrap();
        for (width, height) in [(600.0, 300.0), (1000.0, 500.0), (3840.0, 1000.0), (900.0, 2000.0)] {
            let viewport = ViewportDescriptor::new(
                crate::core::bounds::Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0),
                crate::core::bounds::Bounds::from_xywh(0.0, 0.0, width, height),
            );
            let lens = options.lens.lens(&viewport);
            let ratio = lens.scale(options.zoom.max_zoom, &viewport.content) / viewport.scale();
            assert!(ratio >= options.precision.threshold, "{width}x{height}: {ratio}");
        }
    }
}
