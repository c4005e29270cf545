use crate::paint::Color;

use super::Skeleton;

/// Index pattern for region quads.
pub const QUAD_TRIANGLES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Closed set of attachment kinds the compiler dispatches on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttachmentKind {
    /// Textured quad: 4 world vertices, fixed [`QUAD_TRIANGLES`].
    Region,
    /// Textured mesh: `world_vertices_len / 2` vertices, own triangle list.
    Mesh,
    /// Clip polygon for the slots that follow, up to its end slot.
    Clipping,
    /// Anything else (bounding boxes, paths, points): never drawn.
    Unknown,
}

/// Resolves attachments of skeleton `S` into geometry.
///
/// Buffers are interleaved `[x0, y0, x1, y1, ..]`. World positions are computed by the
/// collaborator (bone transform for regions, weighted deform for meshes); the
/// pipeline treats them as opaque.
pub trait AttachmentResolver<S: Skeleton + ?Sized> {
    fn kind(&self, attachment: &S::Attachment) -> AttachmentKind;

    /// Clears `out` and writes world-space positions for `attachment` on `slot`.
    ///
    /// For clipping attachments this is the clip polygon.
    fn world_vertices(
        &self,
        skeleton: &S,
        slot: usize,
        attachment: &S::Attachment,
        out: &mut Vec<f32>,
    );

    /// Texture coordinates, one pair per vertex. Empty for non-textured kinds.
    fn uvs<'a>(&self, attachment: &'a S::Attachment) -> &'a [f32];

    /// Mesh triangle list. Regions use [`QUAD_TRIANGLES`] and may return an empty slice.
    fn triangle_indices<'a>(&self, attachment: &'a S::Attachment) -> &'a [u16];

    fn color(&self, attachment: &S::Attachment) -> Color;

    /// Logical texture (atlas page path) for textured kinds.
    fn texture_path<'a>(&self, attachment: &'a S::Attachment) -> Option<&'a str>;

    /// For clipping attachments: the slot after which clipping ends. `None` clips to
    /// the end of the frame.
    fn clip_end_slot(&self, attachment: &S::Attachment) -> Option<usize>;
}
