use super::{EventListener, Skeleton};

/// Animation runtime driving a [`Skeleton`].
///
/// All calls happen on the worker thread. Control operations return `false` for
/// unknown animation names instead of failing.
pub trait AnimationEngine: Send {
    type Skeleton: Skeleton;

    /// Advances track time by `delta_seconds` (already time-scaled).
    fn tick(&mut self, delta_seconds: f32);

    /// Poses `skeleton` from the current track state. World transforms are left for the
    /// caller to update.
    fn apply(&mut self, skeleton: &mut Self::Skeleton);

    /// Draw order for this frame. Engines with draw-order timelines write it into the
    /// skeleton during `apply`, which is what the default returns.
    fn current_draw_order<'s>(&self, skeleton: &'s Self::Skeleton) -> &'s [usize] {
        skeleton.draw_order()
    }

    /// Tracks that still have an animation (current or queued).
    fn active_track_count(&self) -> usize;

    fn set_listener(&mut self, listener: Option<EventListener>);

    fn animation_names(&self) -> Vec<String>;

    fn set_animation(&mut self, track: usize, name: &str, looping: bool) -> bool;

    fn add_animation(&mut self, track: usize, name: &str, looping: bool, delay: f32) -> bool;

    fn clear_track(&mut self, track: usize);

    fn clear_tracks(&mut self);

    fn set_mix(&mut self, from: &str, to: &str, duration: f32);

    fn set_default_mix(&mut self, duration: f32);
}
