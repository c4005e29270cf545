use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, TryRecvError};
use parking_lot::Mutex;

use crate::coords::Rect;
use crate::handoff::Handoff;
use crate::skeleton::{AnimationEngine, AttachmentResolver, Skeleton};
use crate::time::{FrameClock, FramePacer};

use super::{PlayerConfig, Scene};

pub(super) type Control<E, R> = Box<dyn FnOnce(&mut Scene<E, R>) + Send>;

pub(super) enum Message<E, R>
where
    E: AnimationEngine,
    R: AttachmentResolver<E::Skeleton>,
{
    Load(Box<Scene<E, R>>),
    Control(Control<E, R>),
}

/// State shared between the player handle, the worker and the render thread.
pub(super) struct Shared {
    pub handoff: Handoff,
    pub config: Mutex<PlayerConfig>,
    pub visible: AtomicBool,
    pub ready: AtomicBool,
    pub frames: AtomicU64,
    pub bounds: Mutex<Rect>,
}

impl Shared {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            handoff: Handoff::with_budget(config.budget),
            config: Mutex::new(config),
            visible: AtomicBool::new(true),
            ready: AtomicBool::new(false),
            frames: AtomicU64::new(0),
            bounds: Mutex::new(Rect::default()),
        }
    }
}

/// Keeps frames coming for a few ticks after the last track ends.
#[derive(Debug, Clone, Copy)]
pub(super) struct FadeGate {
    left: u32,
}

impl FadeGate {
    pub fn new(fade_frames: u32) -> Self {
        Self { left: fade_frames }
    }

    /// Whether this tick should produce a frame.
    pub fn wants_frame(&mut self, active: bool, fade_frames: u32) -> bool {
        if active {
            self.left = fade_frames;
            return true;
        }
        self.left > 0
    }

    pub fn produced(&mut self, active: bool) {
        if !active {
            self.left = self.left.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Applied {
    scale: (f32, f32),
    default_mix: f32,
}

impl Applied {
    fn from_config(config: &PlayerConfig) -> Self {
        Self {
            scale: config.effective_scale(),
            default_mix: config.default_mix,
        }
    }
}

struct Worker<E, R>
where
    E: AnimationEngine,
    R: AttachmentResolver<E::Skeleton>,
{
    scene: Option<Scene<E, R>>,
    pacer: FramePacer,
    clock: FrameClock,
    fade: FadeGate,
    applied: Option<Applied>,
}

impl<E, R> Worker<E, R>
where
    E: AnimationEngine,
    R: AttachmentResolver<E::Skeleton>,
{
    fn new(config: &PlayerConfig) -> Self {
        Self {
            scene: None,
            pacer: FramePacer::new(config.fps, config.max_sleep),
            clock: FrameClock::new(),
            fade: FadeGate::new(config.fade_frames),
            applied: None,
        }
    }

    /// Applies queued messages. Returns `false` once the player handle is gone.
    fn drain(&mut self, rx: &Receiver<Message<E, R>>, shared: &Shared) -> bool {
        loop {
            match rx.try_recv() {
                Ok(Message::Load(scene)) => {
                    self.scene = Some(*scene);
                    self.applied = None;
                    self.clock.reset();
                    shared.ready.store(true, Ordering::Release);
                    log::debug!("player: skeleton loaded");
                }
                Ok(Message::Control(control)) => match self.scene.as_mut() {
                    Some(scene) => control(scene),
                    None => log::warn!("player: control dropped, no skeleton loaded"),
                },
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn frame(&mut self, shared: &Shared, config: &PlayerConfig) {
        self.pacer.set_fps(config.fps);
        let time = self.clock.tick(config.time_scale);

        let Some(scene) = self.scene.as_mut() else { return };

        let applied = Applied::from_config(config);
        if self.applied != Some(applied) {
            let (sx, sy) = applied.scale;
            scene.skeleton_mut().set_scale(sx, sy);
            scene.engine_mut().set_default_mix(applied.default_mix);
            self.applied = Some(applied);
        }
        scene.set_debug(config.debug_overlay());
        scene.advance(time.dt);

        let active = scene.engine().active_track_count() > 0;
        if !self.fade.wants_frame(active, config.fade_frames) {
            return;
        }
        if !shared.visible.load(Ordering::Acquire) && !config.force_render_when_hidden {
            return;
        }
        if !shared.handoff.wait_idle(self.pacer.interval()) {
            log::trace!("player: render thread still holds frame {}", shared.handoff.frame());
            return;
        }

        let mut bounds = Rect::default();
        if scene.compute_frame(&shared.handoff, &mut bounds).is_some() {
            shared.frames.fetch_add(1, Ordering::AcqRel);
            *shared.bounds.lock() = bounds;
            self.fade.produced(active);
        }
    }

    fn pace(&self, handoff: &Handoff) {
        loop {
            if handoff.is_destroyed() || self.pacer.sleep_remaining().is_zero() {
                break;
            }
        }
    }
}

pub(super) fn run<E, R>(shared: Arc<Shared>, rx: Receiver<Message<E, R>>)
where
    E: AnimationEngine,
    R: AttachmentResolver<E::Skeleton>,
{
    let mut worker = Worker::new(&shared.config.lock());
    log::debug!("player worker started");

    loop {
        worker.pacer.begin();
        if !worker.drain(&rx, &shared) || shared.handoff.is_destroyed() {
            break;
        }

        let config = shared.config.lock().clone();
        worker.frame(&shared, &config);
        worker.pace(&shared.handoff);
    }

    log::debug!("player worker stopped after {} frames", shared.frames.load(Ordering::Acquire));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_counts_down_only_when_idle() {
        let mut gate = FadeGate::new(1);
        assert!(gate.wants_frame(true, 1));
        gate.produced(true);
        assert!(gate.wants_frame(true, 1));
        gate.produced(true);

        assert!(gate.wants_frame(false, 1));
        gate.produced(false);
        assert!(!gate.wants_frame(false, 1));
        assert!(!gate.wants_frame(false, 1));

        assert!(gate.wants_frame(true, 1));
    }

    #[test]
    fn zero_fade_stops_immediately() {
        let mut gate = FadeGate::new(0);
        assert!(!gate.wants_frame(false, 0));
        assert!(gate.wants_frame(true, 0));
        assert!(!gate.wants_frame(false, 0));
    }

    #[test]
    fn suppressed_frames_keep_fade_budget() {
        let mut gate = FadeGate::new(2);
        // Asked but never produced (hidden): nothing is consumed.
        assert!(gate.wants_frame(false, 2));
        assert!(gate.wants_frame(false, 2));
        gate.produced(false);
        gate.produced(false);
        assert!(!gate.wants_frame(false, 2));
    }
}
