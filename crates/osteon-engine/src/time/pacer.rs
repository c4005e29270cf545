use std::time::{Duration, Instant};

/// Paces a loop to a target frame interval.
///
/// After each iteration the worker asks for the remaining budget
/// (`interval - elapsed`). Behind schedule yields zero, never a negative sleep; ahead of
/// schedule yields the remainder capped at `max_sleep`, so a destroy request is noticed
/// within one cap even with a very low fps.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    max_sleep: Duration,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(fps: u32, max_sleep: Duration) -> Self {
        Self {
            interval: interval_for(fps),
            max_sleep,
            frame_start: Instant::now(),
        }
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.interval = interval_for(fps);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Marks the start of a frame.
    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Sleep owed at `now` for the frame started by the last [`begin`](Self::begin).
    pub fn remaining_at(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.frame_start);
        self.interval.saturating_sub(elapsed).min(self.max_sleep)
    }

    /// Sleeps the remaining budget, if any. Returns the slept duration.
    pub fn sleep_remaining(&self) -> Duration {
        let wait = self.remaining_at(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        wait
    }
}

fn interval_for(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behind_schedule_never_sleeps_negative() {
        let pacer = FramePacer::new(60, Duration::from_millis(50));
        let late = pacer.frame_start + Duration::from_millis(100);
        assert_eq!(pacer.remaining_at(late), Duration::ZERO);
    }

    #[test]
    fn ahead_of_schedule_sleeps_remainder() {
        let pacer = FramePacer::new(10, Duration::from_secs(1));
        let now = pacer.frame_start + Duration::from_millis(30);
        assert_eq!(pacer.remaining_at(now), Duration::from_millis(70));
    }

    #[test]
    fn sleep_is_capped() {
        let pacer = FramePacer::new(1, Duration::from_millis(20));
        assert_eq!(pacer.remaining_at(pacer.frame_start), Duration::from_millis(20));
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        let pacer = FramePacer::new(0, Duration::from_secs(5));
        assert_eq!(pacer.interval(), Duration::from_secs(1));
    }
}
