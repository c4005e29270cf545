//! Color and compositing model shared by skeleton state, the compiler and the executor.
//!
//! Tints are straight (non-premultiplied) RGBA; the textured shader premultiplies
//! before blending against premultiplied atlas pages.

pub mod blend;
pub mod color;

pub use blend::{BlendFactor, BlendFunc, BlendMode};
pub use color::Color;
