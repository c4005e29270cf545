//! Worker -> render thread frame handoff.
//!
//! One [`CommandCache`](crate::cache::CommandCache) moves through
//! `Idle -> Compiling -> Ready -> Replaying -> Idle`. The worker owns it mutably only
//! while compiling, the render thread reads it only while replaying, and a frame token
//! in a single-slot mailbox tells the render thread there is something to replay.

mod mailbox;
mod state;

pub use mailbox::{FrameToken, Mailbox};
pub use state::{CompileGuard, Handoff, HandoffState, ReplayGuard};
