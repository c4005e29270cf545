//! Skeleton player: a worker thread that ticks, poses and compiles one skeleton while a
//! render thread replays the published frames.
//!
//! Controls are queued to the worker and applied at the start of its next tick, so they
//! never race the compile. The render side polls [`SkeletonPlayer::try_recv_frame`] and
//! hands the token to [`RenderExecutor::render`](crate::render::RenderExecutor::render).

mod config;
mod scene;
mod worker;

pub use config::PlayerConfig;
pub use scene::Scene;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context as _;
use crossbeam_channel::{Sender, unbounded};

use crate::coords::Rect;
use crate::error::{PipelineError, PipelineResult};
use crate::handoff::{FrameToken, Handoff};
use crate::skeleton::{AnimationEngine, AttachmentResolver, EventListener, Skeleton};

use worker::{Message, Shared};

const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(2);

pub struct SkeletonPlayer<E, R>
where
    E: AnimationEngine + 'static,
    E::Skeleton: Send + 'static,
    R: AttachmentResolver<E::Skeleton> + Send + 'static,
{
    shared: Arc<Shared>,
    tx: Option<Sender<Message<E, R>>>,
    worker: Option<JoinHandle<()>>,
}

impl<E, R> SkeletonPlayer<E, R>
where
    E: AnimationEngine + 'static,
    E::Skeleton: Send + 'static,
    R: AttachmentResolver<E::Skeleton> + Send + 'static,
{
    /// Starts the worker thread. Nothing is produced until [`load`](Self::load).
    pub fn spawn(config: PlayerConfig) -> anyhow::Result<Self> {
        let shared = Arc::new(Shared::new(config));
        let (tx, rx) = unbounded();

        let worker = std::thread::Builder::new()
            .name("osteon-player".into())
            .spawn({
                let shared = shared.clone();
                move || worker::run(shared, rx)
            })
            .context("failed to spawn player worker thread")?;

        Ok(Self {
            shared,
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Hands a scene to the worker. Replaces any previously loaded scene.
    pub fn load(&self, scene: Scene<E, R>) -> PipelineResult<()> {
        self.send(Message::Load(Box::new(scene)))?;
        self.shared.ready.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire)
    }

    fn send(&self, message: Message<E, R>) -> PipelineResult<()> {
        let tx = self.tx.as_ref().ok_or(PipelineError::Destroyed)?;
        tx.send(message).map_err(|_| PipelineError::Destroyed)
    }

    fn control<F>(&self, what: &str, f: F) -> PipelineResult<()>
    where
        F: FnOnce(&mut Scene<E, R>) + Send + 'static,
    {
        if !self.is_ready() {
            log::warn!("player: {what} ignored, no skeleton loaded");
            return Err(PipelineError::ResourceNotReady);
        }
        self.send(Message::Control(Box::new(f)))
    }

    pub fn set_to_setup_pose(&self) -> PipelineResult<()> {
        self.control("set_to_setup_pose", |scene| scene.skeleton_mut().set_to_setup_pose())
    }

    pub fn set_bones_to_setup_pose(&self) -> PipelineResult<()> {
        self.control("set_bones_to_setup_pose", |scene| {
            scene.skeleton_mut().set_bones_to_setup_pose()
        })
    }

    pub fn set_slots_to_setup_pose(&self) -> PipelineResult<()> {
        self.control("set_slots_to_setup_pose", |scene| {
            scene.skeleton_mut().set_slots_to_setup_pose()
        })
    }

    pub fn set_attachment(&self, slot: &str, attachment: &str) -> PipelineResult<()> {
        let (slot, attachment) = (slot.to_owned(), attachment.to_owned());
        self.control("set_attachment", move |scene| {
            if !scene.skeleton_mut().set_attachment(&slot, &attachment) {
                log::debug!("player: no attachment `{attachment}` for slot `{slot}`");
            }
        })
    }

    pub fn set_skin(&self, skin: &str) -> PipelineResult<()> {
        let skin = skin.to_owned();
        self.control("set_skin", move |scene| {
            if !scene.skeleton_mut().set_skin(&skin) {
                log::debug!("player: unknown skin `{skin}`");
            }
        })
    }

    pub fn set_animation(&self, track: usize, name: &str, looping: bool) -> PipelineResult<()> {
        let name = name.to_owned();
        self.control("set_animation", move |scene| {
            if !scene.engine_mut().set_animation(track, &name, looping) {
                log::debug!("player: unknown animation `{name}`");
            }
        })
    }

    pub fn add_animation(
        &self,
        track: usize,
        name: &str,
        looping: bool,
        delay: f32,
    ) -> PipelineResult<()> {
        let name = name.to_owned();
        self.control("add_animation", move |scene| {
            if !scene.engine_mut().add_animation(track, &name, looping, delay) {
                log::debug!("player: unknown animation `{name}`");
            }
        })
    }

    pub fn set_mix(&self, from: &str, to: &str, duration: f32) -> PipelineResult<()> {
        let (from, to) = (from.to_owned(), to.to_owned());
        self.control("set_mix", move |scene| scene.engine_mut().set_mix(&from, &to, duration))
    }

    pub fn clear_track(&self, track: usize) -> PipelineResult<()> {
        self.control("clear_track", move |scene| scene.engine_mut().clear_track(track))
    }

    pub fn clear_tracks(&self) -> PipelineResult<()> {
        self.control("clear_tracks", |scene| scene.engine_mut().clear_tracks())
    }

    pub fn set_listener(&self, listener: EventListener) -> PipelineResult<()> {
        self.control("set_listener", move |scene| {
            scene.engine_mut().set_listener(Some(listener))
        })
    }

    pub fn config(&self) -> PlayerConfig {
        self.shared.config.lock().clone()
    }

    fn configure(&self, f: impl FnOnce(&mut PlayerConfig)) {
        f(&mut *self.shared.config.lock());
    }

    pub fn set_fps(&self, fps: u32) {
        self.configure(|c| c.fps = fps);
    }

    pub fn set_time_scale(&self, time_scale: f32) {
        self.configure(|c| c.time_scale = time_scale);
    }

    pub fn set_default_mix(&self, secs: f32) {
        self.configure(|c| c.default_mix = secs);
    }

    pub fn set_skeleton_scale(&self, scale: f32) {
        self.configure(|c| c.skeleton_scale = scale);
    }

    pub fn set_scale(&self, x: f32, y: f32) {
        self.configure(|c| {
            c.scale_x = x;
            c.scale_y = y;
        });
    }

    pub fn set_debug_bones(&self, on: bool) {
        self.configure(|c| c.debug_bones = on);
    }

    pub fn set_debug_slots(&self, on: bool) {
        self.configure(|c| c.debug_slots = on);
    }

    pub fn set_fade_frames(&self, frames: u32) {
        self.configure(|c| c.fade_frames = frames);
    }

    pub fn set_force_render_when_hidden(&self, on: bool) {
        self.configure(|c| c.force_render_when_hidden = on);
    }

    pub fn set_visible(&self, visible: bool) {
        self.shared.visible.store(visible, Ordering::Release);
    }

    pub fn is_visible(&self) -> bool {
        self.shared.visible.load(Ordering::Acquire)
    }

    /// Frames published by the worker since spawn.
    pub fn frames_produced(&self) -> u64 {
        self.shared.frames.load(Ordering::Acquire)
    }

    /// Skeleton bounds of the last published frame.
    pub fn last_bounds(&self) -> Rect {
        *self.shared.bounds.lock()
    }

    pub fn handoff(&self) -> &Handoff {
        &self.shared.handoff
    }

    pub fn try_recv_frame(&self) -> Option<FrameToken> {
        self.shared.handoff.mailbox().try_recv()
    }

    pub fn recv_frame_timeout(&self, timeout: Duration) -> Option<FrameToken> {
        self.shared.handoff.mailbox().recv_timeout(timeout)
    }
}

impl<E, R> Drop for SkeletonPlayer<E, R>
where
    E: AnimationEngine + 'static,
    E::Skeleton: Send + 'static,
    R: AttachmentResolver<E::Skeleton> + Send + 'static,
{
    fn drop(&mut self) {
        self.shared.handoff.request_destroy();
        self.tx.take();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("player worker panicked");
            }
        }

        self.shared.handoff.clear_when_quiescent(TEARDOWN_TIMEOUT);
    }
}
