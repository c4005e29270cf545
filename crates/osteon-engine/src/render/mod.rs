//! Command replay on the GPU thread.
//!
//! The [`RenderExecutor`] consumes a published [`CommandCache`](crate::cache::CommandCache)
//! and issues wgpu draws. It owns every GPU resource it needs (pipelines, buffers,
//! uploaded textures) and creates them lazily.
//!
//! Convention:
//! - CPU geometry is in skeleton world units.
//! - Vertex shaders convert to NDC with the projection captured by `BindShader`.

mod ctx;
mod executor;
mod pipeline;
mod textures;

pub use ctx::{RenderCtx, RenderTarget};
pub use executor::{RenderExecutor, ReplayStats};
