//! Time subsystem.
//!
//! - `FrameClock` produces clamped per-tick deltas for the animation worker
//! - `FramePacer` sleeps the remainder of the target frame interval

mod frame_clock;
mod pacer;

pub use frame_clock::{FrameClock, FrameTime};
pub use pacer::FramePacer;
