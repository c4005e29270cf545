//! Osteon engine crate.
//!
//! Turns a posed 2D skeleton into an ordered list of draw commands on a worker thread
//! and replays them with wgpu on the render thread.

pub mod batch;
pub mod cache;
pub mod clip;
pub mod coords;
pub mod device;
pub mod error;
pub mod handoff;
pub mod logging;
pub mod paint;
pub mod player;
pub mod render;
pub mod rig;
pub mod skeleton;
pub mod texture;
pub mod time;

pub use error::{PipelineError, PipelineResult};
