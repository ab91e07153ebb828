//! Shared utilities
//!
//! Currently only viewport geometry: the point/rectangle primitives and the
//! pure zone-clamping function used by the cursor tracker.

pub mod geometry;

pub use geometry::{clamp_into_rect, Point, Rect};
