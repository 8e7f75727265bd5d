//! # mapscope
//!
//! Adaptive precision pointer for vector region maps.
//!
//! Regions on a world map range from continents down to islands a fraction of
//! a pixel wide. This library keeps a magnifier, automatic zoom selection,
//! cursor dampening and an exclusive pointer-lock mode consistent across the
//! screen, viewport and content coordinate spaces, so a mouse or a finger can
//! land on any of them.

pub mod animation;
pub mod core;
pub mod input;
pub mod magnifier;
pub mod pointer;
pub mod prelude;
pub mod spatial;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{PointerOptions, PointerProfile},
    geo::Point,
    lens::MagnifierLens,
    viewport::ViewportDescriptor,
};

pub use input::{
    events::{Effect, PointerInput, TouchInput},
    state::{InputMode, InteractionState},
};

pub use magnifier::{
    detector::RegionDetector, precision::PrecisionController, probe::ProbeLayout,
    zoom::find_optimal_zoom,
};

pub use pointer::{MagnifierView, PrecisionPointer, SelectedRegion};

pub use spatial::catalog::{RegionCatalog, RegionDescriptor};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, PointerError>;

/// Errors raised at loading boundaries: catalog construction, configuration
/// and view box parsing. Input handling itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum PointerError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Duplicate region id: {0}")]
    DuplicateRegion(String),

    #[error("Invalid view box: {0}")]
    InvalidViewBox(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = PointerError;

/// Routes `log` output to stderr, filtered by `RUST_LOG`
#[cfg(feature = "debug")]
pub fn init_debug_logging() {
    let _ = env_logger::builder().format_timestamp_millis().try_init();
}
