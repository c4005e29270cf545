//! Polygon clipping for clipping attachments.
//!
//! A clip polygon is decomposed once per `clip_start` into convex parts; triangles are
//! then classified against each part (inside / outside / straddling) and only straddling
//! triangles pay for Sutherland-Hodgman.

mod clipper;
mod triangulate;

pub use clipper::{ClippedGeometry, Clipper};
pub use triangulate::{convex_decompose, signed_area, triangulate};
