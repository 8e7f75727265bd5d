//! Everything that decides what the magnifier shows and how the cursor behaves
//! inside it.

pub mod detector;
pub mod precision;
pub mod probe;
pub mod zoom;

// Re-export the essential types
pub use detector::{DetectedRegion, DetectionResult, RegionDetector};
pub use precision::{
    screen_pixel_ratio, DampenedMove, PrecisionAssessment, PrecisionController, PrecisionZone,
};
pub use probe::{ProbeLayout, ProbeMeasurement, ScaleMeasurer};
pub use zoom::{find_optimal_zoom, RegionImportance, ZoomConstraints, ZoomSearchResult};
