use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Scaled animation delta since the previous tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic tick counter.
    pub frame_index: u64,
}

/// Clock producing `FrameTime` snapshots for one animation worker.
///
/// The first tick after construction or [`reset`](Self::reset) yields `dt == 0`, so a
/// freshly loaded skeleton starts at its first pose instead of jumping ahead by the
/// load time. Later deltas are clamped to `dt_max` to keep the animation stable after
/// stalls (debugger pauses, a hidden item that was not ticked, ...).
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(Duration::from_millis(250))
    }

    pub fn with_max_delta(dt_max: Duration) -> Self {
        Self {
            last: None,
            frame_index: 0,
            dt_max,
        }
    }

    /// Drops the baseline; the next tick yields a zero delta.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Advances the clock; `time_scale` multiplies the wall-clock delta.
    pub fn tick(&mut self, time_scale: f32) -> FrameTime {
        self.tick_at(Instant::now(), time_scale)
    }

    pub(crate) fn tick_at(&mut self, now: Instant, time_scale: f32) -> FrameTime {
        let raw = match self.last {
            Some(last) => now.saturating_duration_since(last).min(self.dt_max),
            None => Duration::ZERO,
        };
        self.last = Some(now);

        let ft = FrameTime {
            dt: raw.as_secs_f32() * time_scale.max(0.0),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
