//! Coordinate and geometry types shared by the compiler, clipper and executor.
//!
//! Canonical CPU space:
//! - skeleton world units (the rig decides the scale)
//! - +X right, +Y down
//!
//! The executor converts to NDC with an orthographic projection built from the
//! skeleton bounding rect.

mod projection;
mod rect;
mod vec2;

pub use projection::Projection;
pub use rect::{Bounds, Rect};
pub use vec2::Vec2;
