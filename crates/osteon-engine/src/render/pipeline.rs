use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::batch::Vertex;
use crate::cache::ShaderKind;
use crate::paint::{BlendFactor, BlendFunc};

use super::RenderCtx;

/// Per-draw uniform: projection plus flat color. Bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawUniform {
    pub proj: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Position-only vertex for debug lines and points.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct FlatVertex {
    pub pos: [f32; 2],
}

impl FlatVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FlatVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) enum Topology {
    Triangles,
    Lines,
    Points,
}

impl Topology {
    fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::Points => wgpu::PrimitiveTopology::PointList,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub shader: ShaderKind,
    pub blend: BlendFunc,
    pub topology: Topology,
}

fn factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
    }
}

/// `(One, Zero)` disables blending; everything else blends color and alpha alike.
pub(super) fn blend_state(func: BlendFunc) -> Option<wgpu::BlendState> {
    if func.is_disabled() {
        return None;
    }
    let component = wgpu::BlendComponent {
        src_factor: factor(func.src),
        dst_factor: factor(func.dst),
        operation: wgpu::BlendOperation::Add,
    };
    Some(wgpu::BlendState {
        color: component,
        alpha: component,
    })
}

/// Lazily built pipelines keyed by shader, blend pair and topology.
#[derive(Default)]
pub(super) struct Pipelines {
    format: Option<wgpu::TextureFormat>,

    uniform_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,
    textured_layout: Option<wgpu::PipelineLayout>,
    flat_layout: Option<wgpu::PipelineLayout>,
    textured_shader: Option<wgpu::ShaderModule>,
    flat_shader: Option<wgpu::ShaderModule>,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn uniform_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.uniform_bgl.as_ref()
    }

    pub fn texture_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.texture_bgl.as_ref()
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    /// Creates layouts and shader modules; drops cached pipelines when the target format
    /// changed. Returns `true` when layouts were rebuilt (dependent bind groups are stale).
    pub fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) -> bool {
        if self.format == Some(ctx.target_format) && self.uniform_bgl.is_some() {
            return false;
        }

        let uniform_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("osteon draw uniform bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<DrawUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let texture_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("osteon page bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let textured_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("osteon textured pipeline layout"),
                bind_group_layouts: &[&uniform_bgl, &texture_bgl],
                immediate_size: 0,
            });

        let flat_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("osteon flat pipeline layout"),
                bind_group_layouts: &[&uniform_bgl],
                immediate_size: 0,
            });

        let textured_shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("osteon textured shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/textured.wgsl").into()),
        });
        let flat_shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("osteon flat shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flat.wgsl").into()),
        });

        self.format = Some(ctx.target_format);
        self.uniform_bgl = Some(uniform_bgl);
        self.texture_bgl = Some(texture_bgl);
        self.textured_layout = Some(textured_layout);
        self.flat_layout = Some(flat_layout);
        self.textured_shader = Some(textured_shader);
        self.flat_shader = Some(flat_shader);
        self.pipelines.clear();
        true
    }

    pub fn ensure(&mut self, ctx: &RenderCtx<'_>, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let Some(format) = self.format else { return };

        let (layout, shader, buffers) = match key.shader {
            ShaderKind::Textured => (
                self.textured_layout.as_ref(),
                self.textured_shader.as_ref(),
                Vertex::layout(),
            ),
            ShaderKind::Flat => (
                self.flat_layout.as_ref(),
                self.flat_shader.as_ref(),
                FlatVertex::layout(),
            ),
        };
        let (Some(layout), Some(shader)) = (layout, shader) else { return };

        log::debug!("creating pipeline {key:?}");
        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("osteon pipeline"),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[buffers],
            },

            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: blend_state(key.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: key.topology.to_wgpu(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipelines.insert(key, pipeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::BlendMode;

    #[test]
    fn disabled_pair_maps_to_no_blend() {
        assert!(blend_state(BlendFunc::DISABLED).is_none());
    }

    #[test]
    fn multiply_uses_destination_color() {
        let state = blend_state(BlendMode::Multiply.blend_func()).unwrap();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::Dst);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrc);
    }

    #[test]
    fn uniform_is_mat4_plus_vec4() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 80);
    }
}
