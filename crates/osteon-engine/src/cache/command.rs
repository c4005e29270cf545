use std::ops::Range;

use crate::coords::{Projection, Vec2};
use crate::paint::{BlendFunc, Color};
use crate::texture::TextureId;

/// Shader program selected by `BindShader`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    /// Texture sample times vertex tint.
    Textured,
    /// Single uniform color, for debug geometry.
    Flat,
}

/// One recorded render operation.
///
/// Geometry variants hold ranges into the owning cache's arenas, so they stay valid
/// after the batches they were recorded from are gone.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetBlendFunc(BlendFunc),
    BindShader { kind: ShaderKind, projection: Projection },
    SetUniformColor(Color),
    SetLineWidth(f32),
    SetPointSize(f32),
    DrawTriangles {
        vertices: Range<u32>,
        /// Indices are relative to `vertices.start`.
        indices: Range<u32>,
        texture: TextureId,
    },
    DrawPolygonOutline { points: Range<u32> },
    DrawLineSegment { from: Vec2, to: Vec2 },
    DrawPoint(Vec2),
}

impl Command {
    /// `true` for variants that put pixels on the target.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Command::DrawTriangles { .. }
                | Command::DrawPolygonOutline { .. }
                | Command::DrawLineSegment { .. }
                | Command::DrawPoint(_)
        )
    }
}
