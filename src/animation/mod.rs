pub mod interpolation;
pub mod spring;

// Re-export commonly used types and functions for convenience
pub use interpolation::{EasingFunction, Interpolatable, Interpolation};
pub use spring::{MagnifierAnimator, Spring, Tween};
