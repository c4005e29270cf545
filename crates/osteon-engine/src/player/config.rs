use std::time::Duration;

use crate::cache::{CacheBudget, DebugOverlay};

/// Playback configuration for a [`SkeletonPlayer`](super::SkeletonPlayer).
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Target frames per second for the worker loop.
    pub fps: u32,
    /// Multiplier applied to wall-clock deltas before ticking the engine.
    pub time_scale: f32,
    /// Crossfade used between animations with no explicit mix.
    pub default_mix: f32,
    pub skeleton_scale: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub debug_bones: bool,
    pub debug_slots: bool,
    /// Frames still produced after the last track ends.
    pub fade_frames: u32,
    pub force_render_when_hidden: bool,
    /// Upper bound for a single pacing sleep.
    pub max_sleep: Duration,
    pub budget: CacheBudget,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            time_scale: 1.0,
            default_mix: 0.1,
            skeleton_scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            debug_bones: false,
            debug_slots: false,
            fade_frames: 1,
            force_render_when_hidden: false,
            max_sleep: Duration::from_millis(50),
            budget: CacheBudget::default(),
        }
    }
}

impl PlayerConfig {
    /// Root scale handed to the skeleton: uniform scale times the per-axis factors.
    pub fn effective_scale(&self) -> (f32, f32) {
        (
            self.skeleton_scale * self.scale_x,
            self.skeleton_scale * self.scale_y,
        )
    }

    pub fn debug_overlay(&self) -> DebugOverlay {
        DebugOverlay {
            bones: self.debug_bones,
            slots: self.debug_slots,
        }
    }
}
