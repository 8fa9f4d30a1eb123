//! Region-selection interaction core
//!
//! One logical gesture tracked across any number of surfaces: input
//! normalization, the Idle/Active state machine, viewport-to-pixel
//! mapping, the overlay preview, and hand-off to the region processor.

pub mod gesture;
pub mod mapping;
pub mod overlay;
pub mod region;

pub use gesture::{
    GestureEvent, GesturePhase, GestureTracker, PointerInput, Selection, TouchEvent, TouchPhase,
    TouchPoint, normalize,
};
pub use mapping::{SurfacePoint, map_to_surface};
pub use region::{RegionProcessor, extract_region, sanitize};
