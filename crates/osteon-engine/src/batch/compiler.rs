use std::collections::HashSet;

use crate::clip::Clipper;
use crate::error::{PipelineError, PipelineResult};
use crate::paint::{BlendMode, Color};
use crate::skeleton::{AttachmentKind, AttachmentResolver, QUAD_TRIANGLES, Skeleton};
use crate::texture::{TextureId, TextureResolver};

use super::vertex::{Vertex, assemble};

/// Triangles sharing one texture and blend mode, in world units.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub texture: TextureId,
    pub blend_mode: BlendMode,
    /// Slot the geometry came from.
    pub slot: usize,
}

impl DrawBatch {
    /// Zero-index batches draw nothing and are skipped without touching blend state.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Walks the draw order and emits one [`DrawBatch`] per visible textured slot.
///
/// Holds scratch buffers between frames. Slots that cannot be drawn are skipped and
/// logged; nothing here fails the frame.
#[derive(Default)]
pub struct BatchCompiler {
    batches: Vec<DrawBatch>,
    world: Vec<f32>,
    warned_textures: HashSet<String>,
}

impl BatchCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches produced by the last compile.
    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Compiles using the skeleton's own draw order.
    pub fn compile<S, R, T>(
        &mut self,
        skeleton: &S,
        resolver: &R,
        textures: &T,
        clipper: &mut Clipper,
    ) -> &[DrawBatch]
    where
        S: Skeleton,
        R: AttachmentResolver<S>,
        T: TextureResolver + ?Sized,
    {
        self.compile_in_order(skeleton, skeleton.draw_order(), resolver, textures, clipper)
    }

    /// Compiles slots in `draw_order` (back-to-front). Out-of-range indices are skipped.
    pub fn compile_in_order<S, R, T>(
        &mut self,
        skeleton: &S,
        draw_order: &[usize],
        resolver: &R,
        textures: &T,
        clipper: &mut Clipper,
    ) -> &[DrawBatch]
    where
        S: Skeleton,
        R: AttachmentResolver<S>,
        T: TextureResolver + ?Sized,
    {
        self.batches.clear();
        let tint = skeleton.color();

        for &slot in draw_order {
            if slot >= skeleton.slot_count() {
                log::trace!("draw order references missing slot {slot}");
                continue;
            }

            match self.compile_slot(skeleton, slot, tint, resolver, textures, clipper) {
                Ok(Some(batch)) => self.batches.push(batch),
                Ok(None) => {}
                Err(PipelineError::TextureUnresolved { path }) => {
                    if self.warned_textures.insert(path.clone()) {
                        log::debug!("slot {slot} skipped: texture `{path}` is not registered");
                    }
                }
                Err(e) => log::trace!("slot {slot} skipped: {e}"),
            }

            clipper.clip_end_slot(slot);
        }

        clipper.clip_end();
        &self.batches
    }

    fn compile_slot<S, R, T>(
        &mut self,
        skeleton: &S,
        slot: usize,
        skeleton_tint: Color,
        resolver: &R,
        textures: &T,
        clipper: &mut Clipper,
    ) -> PipelineResult<Option<DrawBatch>>
    where
        S: Skeleton,
        R: AttachmentResolver<S>,
        T: TextureResolver + ?Sized,
    {
        let state = skeleton.slot(slot);
        let Some(attachment) = state.attachment else { return Ok(None) };
        if !state.bone_active || state.color.is_transparent() {
            return Ok(None);
        }

        let kind = resolver.kind(attachment);
        let indices: &[u16] = match kind {
            AttachmentKind::Region => &QUAD_TRIANGLES,
            AttachmentKind::Mesh => resolver.triangle_indices(attachment),
            AttachmentKind::Clipping => {
                resolver.world_vertices(skeleton, slot, attachment, &mut self.world);
                clipper.clip_start(slot, resolver.clip_end_slot(attachment), &self.world);
                return Ok(None);
            }
            AttachmentKind::Unknown => return Ok(None),
        };

        let attachment_color = resolver.color(attachment);
        if attachment_color.is_transparent() {
            return Ok(None);
        }
        let tint = skeleton_tint.modulate(state.color).modulate(attachment_color);
        if tint.is_transparent() {
            return Ok(None);
        }

        let path = resolver.texture_path(attachment).unwrap_or_default();
        let texture = textures
            .resolve(path)
            .ok_or_else(|| PipelineError::TextureUnresolved { path: path.to_owned() })?;

        resolver.world_vertices(skeleton, slot, attachment, &mut self.world);
        let vertex_count = self.world.len() / 2;
        if kind == AttachmentKind::Region && vertex_count != 4 {
            return Err(PipelineError::AttachmentUnresolved {
                slot,
                reason: "region attachment must have 4 vertices",
            });
        }
        if vertex_count > u16::MAX as usize + 1 {
            return Err(PipelineError::AttachmentUnresolved {
                slot,
                reason: "vertex count exceeds the u16 index space",
            });
        }
        if indices.len() % 3 != 0 {
            return Err(PipelineError::AttachmentUnresolved {
                slot,
                reason: "triangle list length is not a multiple of 3",
            });
        }
        if indices.iter().any(|&i| i as usize >= vertex_count) {
            return Err(PipelineError::AttachmentUnresolved {
                slot,
                reason: "triangle index out of range",
            });
        }

        let uvs = resolver.uvs(attachment);
        let mut vertices = Vec::new();

        let indices = if clipper.is_clipping() {
            let clipped = clipper.clip_triangles(&self.world, indices, uvs);
            if clipped.overflowed {
                return Err(PipelineError::AttachmentUnresolved {
                    slot,
                    reason: "clipped geometry exceeds the u16 index space",
                });
            }
            if clipped.is_empty() {
                return Err(PipelineError::DegenerateGeometry { slot });
            }
            assemble(&mut vertices, &clipped.vertices, &clipped.uvs, tint);
            clipped.indices.clone()
        } else {
            assemble(&mut vertices, &self.world, uvs, tint);
            indices.to_vec()
        };

        Ok(Some(DrawBatch {
            vertices,
            indices,
            texture,
            blend_mode: state.blend_mode,
            slot,
        }))
    }
}
