//! Batch compilation: posed skeleton -> ordered list of textured triangle batches.

mod bounds;
mod compiler;
mod vertex;

pub use bounds::compute_bounds;
pub use compiler::{BatchCompiler, DrawBatch};
pub use vertex::Vertex;
