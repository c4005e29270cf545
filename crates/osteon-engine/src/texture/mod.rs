//! Logical texture table.
//!
//! The worker resolves atlas page paths to [`TextureId`]s through [`TextureResolver`]
//! without touching the GPU. Pixels live in the [`TextureRegistry`]; the executor uploads
//! them lazily on first use.

mod registry;

pub use registry::{TextureId, TextureImage, TextureRegistry, TextureResolver};
