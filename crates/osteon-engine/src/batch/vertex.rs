use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

/// Textured, tinted vertex in skeleton world units.
///
/// `color` is the straight-alpha tint; the textured shader premultiplies it.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32x4, // color
    ];

    #[inline]
    pub fn new(x: f32, y: f32, u: f32, v: f32, color: Color) -> Self {
        Self {
            pos: [x, y],
            uv: [u, v],
            color: color.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Builds vertices from interleaved position/uv buffers with one shared tint.
///
/// Missing UVs read as zero.
pub(crate) fn assemble(out: &mut Vec<Vertex>, positions: &[f32], uvs: &[f32], tint: Color) {
    out.clear();
    out.reserve(positions.len() / 2);
    for (i, p) in positions.chunks_exact(2).enumerate() {
        let (u, v) = match uvs.get(i * 2..i * 2 + 2) {
            Some(uv) => (uv[0], uv[1]),
            None => (0.0, 0.0),
        };
        out.push(Vertex::new(p[0], p[1], u, v, tint));
    }
}
