use crate::coords::Vec2;
use crate::paint::{BlendFunc, Color};
use crate::skeleton::{AttachmentKind, AttachmentResolver, Skeleton};

use super::{CommandCache, ShaderKind};

/// Slot outlines and bone lines share one color.
const OUTLINE_COLOR: [u8; 4] = [0, 100, 0, 255];
const JOINT_COLOR: [u8; 4] = [0, 255, 0, 255];

/// Which debug wireframes to append after the textured batches.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DebugOverlay {
    pub bones: bool,
    pub slots: bool,
}

impl DebugOverlay {
    #[inline]
    pub fn is_enabled(self) -> bool {
        self.bones || self.slots
    }
}

fn rgba(c: [u8; 4]) -> Color {
    Color::from_rgba_u8(c[0], c[1], c[2], c[3])
}

impl CommandCache {
    /// Records slot outlines and bone lines under the flat shader.
    ///
    /// Each group sets its own blend state (disabled) and color. Bone lines run from the
    /// bone origin to its tip; the root joint keeps the line color, the rest are drawn in
    /// a brighter green.
    pub fn record_debug<S, R>(&mut self, skeleton: &S, resolver: &R, overlay: DebugOverlay)
    where
        S: Skeleton,
        R: AttachmentResolver<S>,
    {
        if !overlay.is_enabled() {
            return;
        }
        self.bind_shader(ShaderKind::Flat);

        if overlay.slots {
            self.blend_func(BlendFunc::DISABLED);
            self.uniform_color(rgba(OUTLINE_COLOR));
            self.line_width(1.0);

            let mut world = Vec::new();
            let mut outline = Vec::with_capacity(4);
            for slot in 0..skeleton.slot_count() {
                let Some(attachment) = skeleton.slot(slot).attachment else { continue };
                if resolver.kind(attachment) != AttachmentKind::Region {
                    continue;
                }
                resolver.world_vertices(skeleton, slot, attachment, &mut world);
                outline.clear();
                outline.extend((0..world.len() / 2).map(|i| Vec2::from_interleaved(&world, i)));
                self.draw_polygon(&outline);
            }
        }

        if overlay.bones {
            self.blend_func(BlendFunc::DISABLED);
            self.uniform_color(rgba(OUTLINE_COLOR));
            self.line_width(2.0);

            for i in 0..skeleton.bone_count() {
                let bone = skeleton.bone(i);
                if !bone.active {
                    continue;
                }
                let (tx, ty) = bone.tip();
                self.draw_line(Vec2::new(bone.world_x, bone.world_y), Vec2::new(tx, ty));
            }

            self.point_size(4.0);
            for i in 0..skeleton.bone_count() {
                let bone = skeleton.bone(i);
                self.draw_point(Vec2::new(bone.world_x, bone.world_y));
                if i == 0 {
                    self.uniform_color(rgba(JOINT_COLOR));
                }
            }
        }
    }
}
