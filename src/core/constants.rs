//! Core constants for the precision pointer.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Lower bound of the magnifier zoom range.
pub const DEFAULT_MIN_ZOOM: f64 = 1.0;

/// Upper bound of the magnifier zoom range.
pub const DEFAULT_MAX_ZOOM: f64 = 60.0;

/// Narrower on-screen dimension a region must reach to count as comfortably visible.
pub const TARGET_SCREEN_SIZE_PX: f64 = 40.0;

/// Pixel area below which a region is flagged very small.
pub const VERY_SMALL_AREA_PX2: f64 = 200.0;

/// Radius of the candidate search around the cursor, in screen pixels.
pub const DETECTION_RADIUS_PX: f64 = 25.0;

/// Importance multiplier applied to regions that were already found.
pub const FOUND_REGION_SUPPRESSION: f64 = 0.05;

/// Distance (screen px) at which the distance factor of importance halves.
pub const IMPORTANCE_DISTANCE_FALLOFF_PX: f64 = 20.0;

/// Magnifier pixels per main-map pixel at which precision mode kicks in.
pub const PRECISION_MODE_THRESHOLD: f64 = 20.0;

/// Grid cue fades in between `(1 - band)` and `(1 + band)` times the threshold.
pub const PRECISION_FADE_BAND: f64 = 0.3;

/// Cursor movement multiplier right at the precision threshold.
pub const MAX_DAMPENING_MULTIPLIER: f64 = 0.25;

/// Strongest cursor movement multiplier.
pub const MIN_DAMPENING_MULTIPLIER: f64 = 0.03;

/// Cursor speed (px/s) that cancels dampening and the lock offer.
pub const ESCAPE_VELOCITY_PX_PER_S: f64 = 1500.0;

/// How long the "tap to activate precision mode" hint stays visible.
pub const PRECISION_HINT_TIMEOUT_MS: u64 = 3000;

/// Cumulative finger displacement up to which a touch is still a tap.
pub const TAP_MOVEMENT_THRESHOLD_PX: f64 = 5.0;

/// Floor for the starting finger distance of a pinch.
pub const MIN_PINCH_DISTANCE_PX: f64 = 10.0;

/// Default magnifier overlay size (width, height) in pixels.
pub const DEFAULT_LENS_SIZE: (f64, f64) = (300.0, 200.0);

/// Smallest share of the map element, per axis, the magnifier overlay covers.
/// Keeps the magnifier-to-map pixel ratio at zoom 1 at or above this value.
pub const MIN_LENS_FRACTION: f64 = 0.4;

/// Content-space separation of the two scale probes.
pub const PROBE_SEPARATION_UNITS: f64 = 100.0;

/// Probe readings closer than this (px) are treated as not laid out.
pub const MIN_PROBE_DISTANCE_PX: f64 = 1.0;

/// Hot/cold feedback: within this many content units the cursor is "hot".
pub const PROXIMITY_HOT_UNITS: f64 = 25.0;

/// Hot/cold feedback: beyond this many content units the cursor is "cold".
pub const PROXIMITY_COLD_UNITS: f64 = 150.0;
