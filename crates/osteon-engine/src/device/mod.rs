//! Headless GPU device and offscreen render targets.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - owning offscreen framebuffers and reading them back to RGBA8
//! - handing out per-frame encoders for the executor

mod framebuffer;
mod frame;
mod gpu;
mod init;

pub use frame::GpuFrame;
pub use framebuffer::{Framebuffer, FramebufferConfig};
pub use gpu::Gpu;
pub use init::GpuInit;
