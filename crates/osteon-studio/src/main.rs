//! Headless playground: plays the reference rig on a worker thread, replays the frames
//! offscreen and writes the last one to a PNG.
//!
//! Usage: `osteon-studio [output.png] [frames]`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use osteon_engine::device::{Framebuffer, FramebufferConfig, Gpu, GpuInit};
use osteon_engine::logging::{LoggingConfig, init_logging};
use osteon_engine::player::{PlayerConfig, Scene, SkeletonPlayer};
use osteon_engine::render::{RenderCtx, RenderExecutor, RenderTarget};
use osteon_engine::rig::reference::{self, ATLAS_PAGE};
use osteon_engine::rig::{RigEngine, RigResolver, RigSkeleton};
use osteon_engine::skeleton::{AnimationEvent, EventKind};
use osteon_engine::texture::{TextureImage, TextureRegistry};

const DEFAULT_FRAMES: u32 = 120;
const ATLAS_SIZE: u32 = 128;
const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "osteon-frame.png".into()));
    let frames = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid frame count `{n}`"))?,
        None => DEFAULT_FRAMES,
    };

    let gpu = Gpu::new_blocking(GpuInit::default())?;
    let info = gpu.adapter_info();
    log::info!("adapter: {} ({:?})", info.name, info.backend);

    let framebuffer = Framebuffer::new(&gpu, FramebufferConfig::default())?;

    let textures = TextureRegistry::new();
    textures.register(
        ATLAS_PAGE,
        atlas_page(ATLAS_SIZE).context("procedural atlas has the wrong size")?,
    );

    let data = Arc::new(reference::reference_rig());
    let scene = Scene::new(
        RigSkeleton::new(data.clone()),
        RigEngine::new(data),
        RigResolver,
        textures.clone(),
    );

    let player = SkeletonPlayer::<RigEngine, RigResolver>::spawn(PlayerConfig {
        debug_bones: true,
        ..PlayerConfig::default()
    })?;
    player.load(scene)?;
    player.set_listener(Box::new(|event: &AnimationEvent| {
        if event.kind != EventKind::Dispose {
            log::info!("track {}: {:?} `{}`", event.track, event.kind, event.animation);
        }
    }))?;
    player.set_mix("wave", "tuck", 0.25)?;
    player.set_animation(0, "wave", true)?;
    player.add_animation(0, "tuck", false, 1.5)?;
    player.set_animation(1, "pulse", true)?;

    let mut executor = RenderExecutor::new(textures);
    let ctx = RenderCtx::for_framebuffer(&gpu, &framebuffer);

    let mut rendered = 0;
    while rendered < frames {
        let Some(token) = player.recv_frame_timeout(FRAME_TIMEOUT) else {
            bail!("player stopped producing frames after {rendered}");
        };

        let mut frame = gpu.begin_frame(&framebuffer);
        let stats = {
            let mut target = RenderTarget::from_frame(&mut frame);
            executor.render(player.handoff(), token, &ctx, &mut target)
        };
        gpu.submit(frame);

        if let Some(stats) = stats {
            rendered += 1;
            log::debug!("frame {}: {stats:?}", token.frame);
        }
    }

    let bounds = player.last_bounds();
    log::info!(
        "rendered {rendered} frames, last bounds {}x{} at ({}, {})",
        bounds.width(),
        bounds.height(),
        bounds.origin.x,
        bounds.origin.y
    );

    let (width, height) = framebuffer.size();
    let mut rgba = framebuffer.read_rgba(&gpu)?;
    unpremultiply(&mut rgba);

    let image = image::RgbaImage::from_raw(width, height, rgba)
        .context("readback does not match the framebuffer size")?;
    image
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("wrote {}", output.display());

    Ok(())
}

/// Premultiplied RGBA page laid out like the reference rig expects: the left half is
/// the body, the top right the arm, the bottom right a soft glow.
fn atlas_page(size: u32) -> Option<TextureImage> {
    let half = size / 2;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let px = if x < half {
                let shade = 120 + (y * 100 / size) as u8;
                [shade, 80, 60, 255]
            } else if y < half {
                let stripe = ((x + y) / 6) % 2 == 0;
                if stripe { [70, 110, 200, 255] } else { [40, 70, 150, 255] }
            } else {
                let dx = (x - half) as f32 - half as f32 / 2.0;
                let dy = (y - half) as f32 - half as f32 / 2.0;
                let falloff = 1.0 - (dx * dx + dy * dy).sqrt() / (half as f32 / 2.0);
                let a = falloff.clamp(0.0, 1.0);
                premultiply([255, 230, 140], a)
            };
            rgba.extend_from_slice(&px);
        }
    }

    TextureImage::new(size, size, rgba)
}

fn premultiply(rgb: [u8; 3], alpha: f32) -> [u8; 4] {
    let scale = |c: u8| (f32::from(c) * alpha).round() as u8;
    [scale(rgb[0]), scale(rgb[1]), scale(rgb[2]), (alpha * 255.0).round() as u8]
}

/// The framebuffer holds premultiplied color; PNG wants straight alpha.
fn unpremultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
        }
    }
}
