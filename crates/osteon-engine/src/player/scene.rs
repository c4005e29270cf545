use crate::batch::{BatchCompiler, compute_bounds};
use crate::cache::DebugOverlay;
use crate::clip::Clipper;
use crate::coords::Rect;
use crate::handoff::{FrameToken, Handoff};
use crate::skeleton::{AnimationEngine, AttachmentResolver, Skeleton};
use crate::texture::TextureResolver;

/// Everything the worker needs to pose and compile one skeleton.
///
/// A scene is driven from a single thread. [`compute_frame`](Self::compute_frame) is the
/// only place it touches the shared [`Handoff`].
pub struct Scene<E, R>
where
    E: AnimationEngine,
    R: AttachmentResolver<E::Skeleton>,
{
    skeleton: E::Skeleton,
    engine: E,
    resolver: R,
    textures: Box<dyn TextureResolver + Send>,
    compiler: BatchCompiler,
    clipper: Clipper,
    debug: DebugOverlay,
}

impl<E, R> Scene<E, R>
where
    E: AnimationEngine,
    R: AttachmentResolver<E::Skeleton>,
{
    pub fn new(
        skeleton: E::Skeleton,
        engine: E,
        resolver: R,
        textures: impl TextureResolver + Send + 'static,
    ) -> Self {
        Self {
            skeleton,
            engine,
            resolver,
            textures: Box::new(textures),
            compiler: BatchCompiler::new(),
            clipper: Clipper::new(),
            debug: DebugOverlay::default(),
        }
    }

    pub fn skeleton(&self) -> &E::Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut E::Skeleton {
        &mut self.skeleton
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn debug(&self) -> DebugOverlay {
        self.debug
    }

    pub fn set_debug(&mut self, overlay: DebugOverlay) {
        self.debug = overlay;
    }

    /// Ticks the engine by `dt` seconds and poses the skeleton.
    pub fn advance(&mut self, dt: f32) {
        self.engine.tick(dt);
        self.engine.apply(&mut self.skeleton);
        self.skeleton.update_world_transform();
    }

    /// World-space bounds of the current pose.
    pub fn bounds(&self) -> Rect {
        compute_bounds(&self.skeleton, &self.resolver)
    }

    /// Compiles the posed skeleton into the handoff cache and publishes it.
    ///
    /// Returns `None` when the cache is still owned by the render thread or teardown
    /// began; the frame is simply not produced. `bounds_out` receives the bounds used
    /// for the projection of a produced frame.
    pub fn compute_frame(&mut self, handoff: &Handoff, bounds_out: &mut Rect) -> Option<FrameToken> {
        let mut cache = match handoff.begin_compiling() {
            Ok(guard) => guard,
            Err(e) => {
                log::trace!("frame not compiled: {e}");
                return None;
            }
        };

        let bounds = compute_bounds(&self.skeleton, &self.resolver);
        cache.set_viewport(bounds);

        let draw_order = self.engine.current_draw_order(&self.skeleton);
        let batches = self.compiler.compile_in_order(
            &self.skeleton,
            draw_order,
            &self.resolver,
            self.textures.as_ref(),
            &mut self.clipper,
        );
        cache.record_batches(batches);
        cache.record_debug(&self.skeleton, &self.resolver, self.debug);

        match cache.publish() {
            Ok(token) => {
                *bounds_out = bounds;
                Some(token)
            }
            Err(e) => {
                log::debug!("frame abandoned: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{Command, ShaderKind};
    use crate::handoff::HandoffState;
    use crate::rig::reference::{self, ATLAS_PAGE};
    use crate::rig::{RigEngine, RigResolver, RigSkeleton};
    use crate::texture::{TextureImage, TextureRegistry};

    fn scene() -> Scene<RigEngine, RigResolver> {
        let data = Arc::new(reference::reference_rig());
        let textures = TextureRegistry::new();
        textures.register(ATLAS_PAGE, TextureImage::solid(4, 4, [255, 255, 255, 255]).unwrap());
        Scene::new(RigSkeleton::new(data.clone()), RigEngine::new(data), RigResolver, textures)
    }

    #[test]
    fn compute_frame_publishes_textured_draws() {
        let mut scene = scene();
        let handoff = Handoff::new();
        let mut bounds = Rect::default();

        scene.advance(0.0);
        let token = scene.compute_frame(&handoff, &mut bounds).unwrap();

        assert_eq!(token.frame, 1);
        assert_eq!(handoff.state(), HandoffState::Ready);
        assert!(!bounds.is_empty());

        let guard = handoff.try_begin_replay(token).unwrap();
        assert!(matches!(
            guard.commands()[0],
            Command::BindShader { kind: ShaderKind::Textured, .. }
        ));
        assert!(guard.commands().iter().any(Command::is_draw));
        assert_eq!(guard.viewport(), bounds);
    }

    #[test]
    fn compute_frame_refused_while_ready() {
        let mut scene = scene();
        let handoff = Handoff::new();
        let mut bounds = Rect::default();

        assert!(scene.compute_frame(&handoff, &mut bounds).is_some());
        assert!(scene.compute_frame(&handoff, &mut bounds).is_none());
        assert_eq!(handoff.frame(), 1);
    }

    #[test]
    fn debug_overlay_follows_textured_pass() {
        let mut scene = scene();
        scene.set_debug(DebugOverlay { bones: true, slots: false });
        let handoff = Handoff::new();
        let mut bounds = Rect::default();

        let token = scene.compute_frame(&handoff, &mut bounds).unwrap();
        let guard = handoff.try_begin_replay(token).unwrap();
        let flat = guard
            .commands()
            .iter()
            .position(|c| matches!(c, Command::BindShader { kind: ShaderKind::Flat, .. }))
            .unwrap();
        assert!(guard.commands()[..flat]
            .iter()
            .any(|c| matches!(c, Command::DrawTriangles { .. })));
        assert!(guard.commands()[flat..]
            .iter()
            .any(|c| matches!(c, Command::DrawPoint(_))));
    }
}
