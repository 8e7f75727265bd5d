pub mod events;
pub mod gestures;
pub mod state;

// Re-export the essential types
pub use events::{
    Effect, InteractionEvent, PointerAction, PointerInput, TouchInput, TouchPhase, TouchPoint,
    TouchTarget,
};
pub use gestures::{classify_motion, pinch_zoom, GestureContext, MotionKind, TouchGestureHandler};
pub use state::{reduce, InputMode, InteractionState, Transition};
