//! Per-frame render command cache.
//!
//! The worker records [`Command`]s (plus deep-copied geometry) while compiling; the
//! render thread replays them in order. Nothing executes at record time.

mod command;
mod debug;
mod recorder;

pub use command::{Command, ShaderKind};
pub use debug::DebugOverlay;
pub use recorder::{CacheBudget, CommandCache};
