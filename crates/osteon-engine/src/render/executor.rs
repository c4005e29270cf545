use std::collections::HashSet;
use std::ops::Range;

use crate::cache::{Command, CommandCache, ShaderKind};
use crate::coords::{Projection, Vec2};
use crate::handoff::{FrameToken, Handoff};
use crate::paint::{BlendFunc, BlendMode, Color};
use crate::texture::{TextureId, TextureRegistry};

use super::pipeline::{DrawUniform, FlatVertex, PipelineKey, Pipelines, Topology};
use super::textures::GpuTextures;
use super::{RenderCtx, RenderTarget};

/// Draw resolved from the command stream, ready for the render pass.
enum Op {
    Triangles {
        key: PipelineKey,
        uniform: u32,
        vertices: Range<u32>,
        indices: Range<u32>,
        texture: TextureId,
    },
    Flat {
        key: PipelineKey,
        uniform: u32,
        vertices: Range<u32>,
    },
}

impl Op {
    fn key(&self) -> PipelineKey {
        match self {
            Op::Triangles { key, .. } | Op::Flat { key, .. } => *key,
        }
    }
}

/// Render state threaded through command translation.
struct ReplayState {
    shader: Option<ShaderKind>,
    blend: BlendFunc,
    projection: Projection,
    color: Color,
    /// Projection or color changed since the last uniform slot was written.
    dirty: bool,
}

/// Counters for one replay.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub commands: usize,
    pub draws: usize,
    /// Draws dropped because their texture had no pixels.
    pub skipped: usize,
}

/// Replays command caches into a render target. GPU thread only.
///
/// Every replay opens one render pass that clears to transparent black and starts from
/// the Normal blend pair, so no state leaks between frames.
pub struct RenderExecutor {
    registry: TextureRegistry,
    pipelines: Pipelines,
    textures: GpuTextures,

    uniform_stride: u64,
    uniform_ubo: Option<wgpu::Buffer>,
    uniform_capacity: usize,
    uniform_bind_group: Option<wgpu::BindGroup>,

    vertex_vbo: Option<wgpu::Buffer>,
    vertex_capacity: u64,
    index_ibo: Option<wgpu::Buffer>,
    index_capacity: u64,
    flat_vbo: Option<wgpu::Buffer>,
    flat_capacity: u64,

    ops: Vec<Op>,
    uniforms: Vec<DrawUniform>,
    flat_vertices: Vec<FlatVertex>,
    index_scratch: Vec<u16>,
    uniform_scratch: Vec<u8>,

    warned_line_width: bool,
    warned_point_size: bool,
}

impl RenderExecutor {
    pub fn new(registry: TextureRegistry) -> Self {
        Self {
            registry,
            pipelines: Pipelines::default(),
            textures: GpuTextures::default(),
            uniform_stride: 0,
            uniform_ubo: None,
            uniform_capacity: 0,
            uniform_bind_group: None,
            vertex_vbo: None,
            vertex_capacity: 0,
            index_ibo: None,
            index_capacity: 0,
            flat_vbo: None,
            flat_capacity: 0,
            ops: Vec::new(),
            uniforms: Vec::new(),
            flat_vertices: Vec::new(),
            index_scratch: Vec::new(),
            uniform_scratch: Vec::new(),
            warned_line_width: false,
            warned_point_size: false,
        }
    }

    /// Replays the frame named by `token` if the handoff is `Ready` for it.
    ///
    /// Returns `None` when the handoff refused the replay (wrong state, stale token or
    /// teardown). The handoff returns to `Idle` before this returns.
    pub fn render(
        &mut self,
        handoff: &Handoff,
        token: FrameToken,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> Option<ReplayStats> {
        let cache = handoff.try_begin_replay(token)?;
        Some(self.replay(&cache, ctx, target))
    }

    /// Records the whole cache into `target`. An empty cache still clears the target.
    pub fn replay(
        &mut self,
        cache: &CommandCache,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> ReplayStats {
        if self.pipelines.ensure_layouts(ctx) {
            self.textures.invalidate();
            self.uniform_bind_group = None;
        }

        self.translate(cache);

        let keys: HashSet<PipelineKey> = self.ops.iter().map(Op::key).collect();
        for key in keys {
            self.pipelines.ensure(ctx, key);
        }

        let textures: HashSet<TextureId> = self
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Triangles { texture, .. } => Some(*texture),
                Op::Flat { .. } => None,
            })
            .collect();
        if let Some(layout) = self.pipelines.texture_layout() {
            for id in textures {
                self.textures.ensure(ctx, layout, &self.registry, id);
            }
        }

        // Mutating methods must happen before borrowing pipelines/buffers immutably.
        self.upload(ctx, cache);

        let mut stats = ReplayStats {
            commands: cache.len(),
            ..ReplayStats::default()
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("osteon replay pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(uniform_bg) = self.uniform_bind_group.as_ref() else { return stats };

        for op in &self.ops {
            let Some(pipeline) = self.pipelines.get(&op.key()) else { continue };
            match op {
                Op::Triangles { uniform, vertices, indices, texture, .. } => {
                    let (Some(page), Some(vbo), Some(ibo)) = (
                        self.textures.bind_group(*texture),
                        self.vertex_vbo.as_ref(),
                        self.index_ibo.as_ref(),
                    ) else {
                        stats.skipped += 1;
                        continue;
                    };
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(0, uniform_bg, &[self.uniform_offset(*uniform)]);
                    rpass.set_bind_group(1, page, &[]);
                    rpass.set_vertex_buffer(0, vbo.slice(..));
                    rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(indices.clone(), vertices.start as i32, 0..1);
                }
                Op::Flat { uniform, vertices, .. } => {
                    let Some(vbo) = self.flat_vbo.as_ref() else { continue };
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(0, uniform_bg, &[self.uniform_offset(*uniform)]);
                    rpass.set_vertex_buffer(0, vbo.slice(..));
                    rpass.draw(vertices.clone(), 0..1);
                }
            }
            stats.draws += 1;
        }

        stats
    }

    fn uniform_offset(&self, slot: u32) -> wgpu::DynamicOffset {
        (slot as u64 * self.uniform_stride) as wgpu::DynamicOffset
    }

    /// Walks the command stream once, resolving state into self-contained ops.
    fn translate(&mut self, cache: &CommandCache) {
        self.ops.clear();
        self.uniforms.clear();
        self.flat_vertices.clear();

        let mut state = ReplayState {
            shader: None,
            blend: BlendMode::Normal.blend_func(),
            projection: Projection::new(cache.viewport()),
            color: Color::WHITE,
            dirty: true,
        };

        for command in cache.commands() {
            match command {
                Command::SetBlendFunc(func) => state.blend = *func,
                Command::BindShader { kind, projection } => {
                    state.shader = Some(*kind);
                    state.projection = *projection;
                    state.dirty = true;
                }
                Command::SetUniformColor(color) => {
                    state.color = *color;
                    state.dirty = true;
                }
                Command::SetLineWidth(w) => {
                    if (w - 1.0).abs() > f32::EPSILON && !self.warned_line_width {
                        log::debug!("line width {w} not supported by the backend; drawing 1px lines");
                        self.warned_line_width = true;
                    }
                }
                Command::SetPointSize(s) => {
                    if (s - 1.0).abs() > f32::EPSILON && !self.warned_point_size {
                        log::debug!("point size {s} not supported by the backend; drawing 1px points");
                        self.warned_point_size = true;
                    }
                }
                Command::DrawTriangles { vertices, indices, texture } => {
                    if state.shader != Some(ShaderKind::Textured) {
                        log::trace!("textured draw without textured shader bound; skipped");
                        continue;
                    }
                    let uniform = self.uniform_slot(&mut state);
                    self.ops.push(Op::Triangles {
                        key: PipelineKey {
                            shader: ShaderKind::Textured,
                            blend: state.blend,
                            topology: Topology::Triangles,
                        },
                        uniform,
                        vertices: vertices.clone(),
                        indices: indices.clone(),
                        texture: *texture,
                    });
                }
                Command::DrawPolygonOutline { points } => {
                    let points = &cache.points()[points.start as usize..points.end as usize];
                    let n = points.len();
                    let outline = (0..n).flat_map(|i| [points[i], points[(i + 1) % n]]);
                    self.push_flat(&mut state, Topology::Lines, outline);
                }
                Command::DrawLineSegment { from, to } => {
                    self.push_flat(&mut state, Topology::Lines, [*from, *to]);
                }
                Command::DrawPoint(p) => {
                    self.push_flat(&mut state, Topology::Points, [*p]);
                }
            }
        }
    }

    fn uniform_slot(&mut self, state: &mut ReplayState) -> u32 {
        if state.dirty || self.uniforms.is_empty() {
            self.uniforms.push(DrawUniform {
                proj: state.projection.matrix(),
                color: state.color.to_array(),
            });
            state.dirty = false;
        }
        (self.uniforms.len() - 1) as u32
    }

    fn push_flat(
        &mut self,
        state: &mut ReplayState,
        topology: Topology,
        points: impl IntoIterator<Item = Vec2>,
    ) {
        if state.shader != Some(ShaderKind::Flat) {
            log::trace!("debug draw without flat shader bound; skipped");
            return;
        }
        let start = self.flat_vertices.len() as u32;
        self.flat_vertices
            .extend(points.into_iter().map(|p| FlatVertex { pos: [p.x, p.y] }));
        let end = self.flat_vertices.len() as u32;
        if start == end {
            return;
        }
        let uniform = self.uniform_slot(state);
        self.ops.push(Op::Flat {
            key: PipelineKey {
                shader: ShaderKind::Flat,
                blend: state.blend,
                topology,
            },
            uniform,
            vertices: start..end,
        });
    }

    fn upload(&mut self, ctx: &RenderCtx<'_>, cache: &CommandCache) {
        // Uniforms: one slot per state change, padded to the dynamic offset alignment.
        let align = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        let size = std::mem::size_of::<DrawUniform>() as u64;
        let stride = size.div_ceil(align) * align;
        if stride != self.uniform_stride {
            self.uniform_stride = stride;
            self.uniform_ubo = None;
            self.uniform_capacity = 0;
        }

        let slots = self.uniforms.len().max(1);
        if slots > self.uniform_capacity || self.uniform_ubo.is_none() {
            let capacity = slots.next_power_of_two().max(16);
            self.uniform_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("osteon draw uniform ubo"),
                size: capacity as u64 * stride,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.uniform_capacity = capacity;
            self.uniform_bind_group = None;
        }

        if self.uniform_bind_group.is_none() {
            let layout = self.pipelines.uniform_layout();
            if let (Some(layout), Some(ubo)) = (layout, self.uniform_ubo.as_ref()) {
                let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("osteon draw uniform bind group"),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: ubo,
                            offset: 0,
                            size: wgpu::BufferSize::new(size),
                        }),
                    }],
                });
                self.uniform_bind_group = Some(bind_group);
            }
        }

        if let Some(ubo) = self.uniform_ubo.as_ref() {
            if !self.uniforms.is_empty() {
                self.uniform_scratch.clear();
                self.uniform_scratch.resize(self.uniforms.len() * stride as usize, 0);
                for (i, u) in self.uniforms.iter().enumerate() {
                    let at = i * stride as usize;
                    self.uniform_scratch[at..at + size as usize]
                        .copy_from_slice(bytemuck::bytes_of(u));
                }
                ctx.queue.write_buffer(ubo, 0, &self.uniform_scratch);
            }
        }

        // Geometry arenas.
        let vertices: &[u8] = bytemuck::cast_slice(cache.vertices());
        ensure_capacity(
            ctx,
            &mut self.vertex_vbo,
            &mut self.vertex_capacity,
            vertices.len() as u64,
            wgpu::BufferUsages::VERTEX,
            "osteon vertex arena",
        );
        if let (Some(vbo), false) = (self.vertex_vbo.as_ref(), vertices.is_empty()) {
            ctx.queue.write_buffer(vbo, 0, vertices);
        }

        self.index_scratch.clear();
        self.index_scratch.extend_from_slice(cache.indices());
        if self.index_scratch.len() % 2 == 1 {
            // Copies must be 4-byte aligned.
            self.index_scratch.push(0);
        }
        let indices: &[u8] = bytemuck::cast_slice(&self.index_scratch);
        ensure_capacity(
            ctx,
            &mut self.index_ibo,
            &mut self.index_capacity,
            indices.len() as u64,
            wgpu::BufferUsages::INDEX,
            "osteon index arena",
        );
        if let (Some(ibo), false) = (self.index_ibo.as_ref(), indices.is_empty()) {
            ctx.queue.write_buffer(ibo, 0, indices);
        }

        let flat: &[u8] = bytemuck::cast_slice(&self.flat_vertices);
        ensure_capacity(
            ctx,
            &mut self.flat_vbo,
            &mut self.flat_capacity,
            flat.len() as u64,
            wgpu::BufferUsages::VERTEX,
            "osteon debug vertex arena",
        );
        if let (Some(vbo), false) = (self.flat_vbo.as_ref(), flat.is_empty()) {
            ctx.queue.write_buffer(vbo, 0, flat);
        }
    }
}

fn ensure_capacity(
    ctx: &RenderCtx<'_>,
    buffer: &mut Option<wgpu::Buffer>,
    capacity: &mut u64,
    required: u64,
    usage: wgpu::BufferUsages,
    label: &'static str,
) {
    if required <= *capacity && buffer.is_some() {
        return;
    }
    let new_cap = required.next_power_of_two().max(1024);
    *buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: new_cap,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    }));
    *capacity = new_cap;
}
