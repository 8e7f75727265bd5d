//! Prelude module for common mapscope types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapscope::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{
        AnimationConfig, DetectionConfig, GestureConfig, LensConfig, PointerOptions,
        PointerProfile, PrecisionConfig, ProbeConfig, ZoomConfig,
    },
    geo::Point,
    lens::{touch_multiplier, LensTransform, MagnifierLens},
    viewport::ViewportDescriptor,
};

pub use crate::spatial::catalog::{RegionCatalog, RegionDescriptor};

pub use crate::magnifier::{
    detector::{DetectedRegion, DetectionResult, RegionDetector},
    precision::{screen_pixel_ratio, PrecisionAssessment, PrecisionController, PrecisionZone},
    probe::{ProbeLayout, ProbeMeasurement, ScaleMeasurer},
    zoom::{find_optimal_zoom, ZoomConstraints, ZoomSearchResult},
};

pub use crate::input::{
    events::{Effect, InteractionEvent, PointerAction, PointerInput, TouchInput, TouchPhase, TouchTarget},
    gestures::{classify_motion, pinch_zoom, MotionKind, TouchGestureHandler},
    state::{reduce, InputMode, InteractionState, Transition},
};

pub use crate::animation::{MagnifierAnimator, Spring};

pub use crate::pointer::{
    debug::DebugSnapshot, CursorPosition, CursorUpdate, MagnifierView, PrecisionPointer, Proximity,
    ProximityLevel, SelectedRegion,
};

pub use crate::traits::CoordinateTransform;

pub use crate::{PointerError, Result};

pub use std::sync::Arc;

pub use instant::{Duration, Instant};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
