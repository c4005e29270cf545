use std::sync::Arc;

use crate::paint::Color;
use crate::skeleton::{AttachmentKind, AttachmentResolver, BoneState, Skeleton, SlotState};

use super::data::{RigAttachment, SkeletonData};

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Bone {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub active: bool,
    world: BoneState,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Slot {
    pub color: Color,
    /// `(skin, entry)` into `SkeletonData::skins`.
    pub attachment: Option<(usize, usize)>,
}

/// Posed instance of a [`SkeletonData`].
#[derive(Debug, Clone)]
pub struct RigSkeleton {
    data: Arc<SkeletonData>,
    pub(super) bones: Vec<Bone>,
    pub(super) slots: Vec<Slot>,
    pub(super) draw_order: Vec<usize>,
    skin: Option<usize>,
    color: Color,
    x: f32,
    y: f32,
    scale_x: f32,
    scale_y: f32,
}

impl RigSkeleton {
    pub fn new(data: Arc<SkeletonData>) -> Self {
        let bones = data
            .bones
            .iter()
            .map(|b| Bone {
                x: b.x,
                y: b.y,
                rotation: b.rotation,
                scale_x: b.scale_x,
                scale_y: b.scale_y,
                active: true,
                world: BoneState::default(),
            })
            .collect();
        let slots = data
            .slots
            .iter()
            .map(|s| Slot { color: s.color, attachment: None })
            .collect();

        let mut skeleton = Self {
            draw_order: (0..data.slots.len()).collect(),
            data,
            bones,
            slots,
            skin: None,
            color: Color::WHITE,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        skeleton.set_slots_to_setup_pose();
        skeleton.update_world_transform();
        skeleton
    }

    pub fn data(&self) -> &Arc<SkeletonData> {
        &self.data
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn set_bone_active(&mut self, bone: usize, active: bool) {
        if let Some(b) = self.bones.get_mut(bone) {
            b.active = active;
        }
    }

    pub fn set_slot_color(&mut self, slot: usize, color: Color) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.color = color;
        }
    }

    pub fn set_draw_order(&mut self, order: Vec<usize>) {
        self.draw_order = order;
    }

    /// Active skin first, then the default skin.
    fn find_attachment(&self, slot: usize, name: &str) -> Option<(usize, usize)> {
        self.skin
            .into_iter()
            .chain(std::iter::once(0))
            .find_map(|skin| self.data.skins[skin].find(slot, name).map(|entry| (skin, entry)))
    }

    fn attachment_ref(&self, r: (usize, usize)) -> &RigAttachment {
        &self.data.skins[r.0].entries[r.1].attachment
    }

    fn attachment_name(&self, slot: usize) -> Option<&str> {
        self.slots[slot].attachment.map(|r| self.attachment_ref(r).name())
    }

    /// Sets `slot`'s attachment by name; `None` clears it. Unknown names clear too.
    pub(super) fn set_slot_attachment(&mut self, slot: usize, name: Option<&str>) {
        let found = name.and_then(|n| self.find_attachment(slot, n));
        if let Some(s) = self.slots.get_mut(slot) {
            s.attachment = found;
        }
    }

    /// World transform of `(x, y)` in bone space.
    fn to_world(&self, bone: usize, x: f32, y: f32) -> (f32, f32) {
        let w = &self.bones[bone].world;
        (w.a * x + w.b * y + w.world_x, w.c * x + w.d * y + w.world_y)
    }
}

impl Skeleton for RigSkeleton {
    type Attachment = RigAttachment;

    fn color(&self) -> Color {
        self.color
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, index: usize) -> SlotState<'_, RigAttachment> {
        let data = &self.data.slots[index];
        let slot = &self.slots[index];
        SlotState {
            name: &data.name,
            color: slot.color,
            blend_mode: data.blend_mode,
            bone: data.bone,
            bone_active: self.bones[data.bone].active,
            attachment: slot.attachment.map(|r| self.attachment_ref(r)),
        }
    }

    fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn bone(&self, index: usize) -> BoneState {
        self.bones[index].world
    }

    fn update_world_transform(&mut self) {
        for i in 0..self.bones.len() {
            let data = &self.data.bones[i];
            let bone = &self.bones[i];

            let (sin, cos) = bone.rotation.to_radians().sin_cos();
            let la = cos * bone.scale_x;
            let lb = -sin * bone.scale_y;
            let lc = sin * bone.scale_x;
            let ld = cos * bone.scale_y;

            let parent = data.parent.filter(|&p| p < i).map(|p| self.bones[p].world);
            let world = match parent {
                Some(p) => BoneState {
                    world_x: p.a * bone.x + p.b * bone.y + p.world_x,
                    world_y: p.c * bone.x + p.d * bone.y + p.world_y,
                    a: p.a * la + p.b * lc,
                    b: p.a * lb + p.b * ld,
                    c: p.c * la + p.d * lc,
                    d: p.c * lb + p.d * ld,
                    length: data.length,
                    active: bone.active,
                },
                None => BoneState {
                    world_x: bone.x * self.scale_x + self.x,
                    world_y: bone.y * self.scale_y + self.y,
                    a: la * self.scale_x,
                    b: lb * self.scale_x,
                    c: lc * self.scale_y,
                    d: ld * self.scale_y,
                    length: data.length,
                    active: bone.active,
                },
            };
            self.bones[i].world = world;
        }
    }

    fn set_bones_to_setup_pose(&mut self) {
        for (bone, data) in self.bones.iter_mut().zip(&self.data.bones) {
            bone.x = data.x;
            bone.y = data.y;
            bone.rotation = data.rotation;
            bone.scale_x = data.scale_x;
            bone.scale_y = data.scale_y;
        }
    }

    fn set_slots_to_setup_pose(&mut self) {
        let data = Arc::clone(&self.data);
        for (i, slot) in data.slots.iter().enumerate() {
            self.slots[i].color = slot.color;
            self.set_slot_attachment(i, slot.attachment.as_deref());
        }
        self.draw_order = (0..self.slots.len()).collect();
    }

    fn set_attachment(&mut self, slot: &str, attachment: &str) -> bool {
        let Some(index) = self.data.find_slot(slot) else { return false };
        let Some(found) = self.find_attachment(index, attachment) else { return false };
        self.slots[index].attachment = Some(found);
        true
    }

    fn set_skin(&mut self, skin: &str) -> bool {
        let Some(index) = self.data.find_skin(skin) else { return false };
        let previous = self.skin.replace(index);

        for slot in 0..self.slots.len() {
            let wanted = match previous {
                Some(_) => self.attachment_name(slot).map(str::to_owned),
                None => self.data.slots[slot].attachment.clone(),
            };
            if let Some(name) = wanted {
                if let Some(entry) = self.data.skins[index].find(slot, &name) {
                    self.slots[slot].attachment = Some((index, entry));
                }
            }
        }
        true
    }

    fn skin_names(&self) -> Vec<String> {
        self.data.skins.iter().map(|s| s.name.clone()).collect()
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        self.scale_x = x;
        self.scale_y = y;
    }
}

/// [`AttachmentResolver`] for [`RigSkeleton`].
#[derive(Debug, Copy, Clone, Default)]
pub struct RigResolver;

impl RigResolver {
    fn transform_into(skeleton: &RigSkeleton, bone: usize, local: &[f32], out: &mut Vec<f32>) {
        out.clear();
        out.reserve(local.len());
        for p in local.chunks_exact(2) {
            let (x, y) = skeleton.to_world(bone, p[0], p[1]);
            out.extend_from_slice(&[x, y]);
        }
    }
}

impl AttachmentResolver<RigSkeleton> for RigResolver {
    fn kind(&self, attachment: &RigAttachment) -> AttachmentKind {
        match attachment {
            RigAttachment::Region(_) => AttachmentKind::Region,
            RigAttachment::Mesh(_) => AttachmentKind::Mesh,
            RigAttachment::Clipping(_) => AttachmentKind::Clipping,
            RigAttachment::BoundingBox(_) => AttachmentKind::Unknown,
        }
    }

    fn world_vertices(
        &self,
        skeleton: &RigSkeleton,
        slot: usize,
        attachment: &RigAttachment,
        out: &mut Vec<f32>,
    ) {
        let bone = skeleton.data.slots[slot].bone;
        match attachment {
            RigAttachment::Region(r) => Self::transform_into(skeleton, bone, &r.local_corners(), out),
            RigAttachment::Mesh(m) => Self::transform_into(skeleton, bone, &m.vertices, out),
            RigAttachment::Clipping(c) => Self::transform_into(skeleton, bone, &c.vertices, out),
            RigAttachment::BoundingBox(b) => Self::transform_into(skeleton, bone, &b.vertices, out),
        }
    }

    fn uvs<'a>(&self, attachment: &'a RigAttachment) -> &'a [f32] {
        match attachment {
            RigAttachment::Region(r) => &r.uvs,
            RigAttachment::Mesh(m) => &m.uvs,
            RigAttachment::Clipping(_) | RigAttachment::BoundingBox(_) => &[],
        }
    }

    fn triangle_indices<'a>(&self, attachment: &'a RigAttachment) -> &'a [u16] {
        match attachment {
            RigAttachment::Mesh(m) => &m.triangles,
            _ => &[],
        }
    }

    fn color(&self, attachment: &RigAttachment) -> Color {
        match attachment {
            RigAttachment::Region(r) => r.color,
            RigAttachment::Mesh(m) => m.color,
            RigAttachment::Clipping(_) | RigAttachment::BoundingBox(_) => Color::WHITE,
        }
    }

    fn texture_path<'a>(&self, attachment: &'a RigAttachment) -> Option<&'a str> {
        match attachment {
            RigAttachment::Region(r) => Some(&r.path),
            RigAttachment::Mesh(m) => Some(&m.path),
            RigAttachment::Clipping(_) | RigAttachment::BoundingBox(_) => None,
        }
    }

    fn clip_end_slot(&self, attachment: &RigAttachment) -> Option<usize> {
        match attachment {
            RigAttachment::Clipping(c) => c.end_slot,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{BoneData, RegionAttachment, SlotData};

    fn two_bone_arm() -> Arc<SkeletonData> {
        let mut data = SkeletonData::new(
            vec![
                BoneData::new("root", None).at(100.0, 50.0).with_length(10.0),
                BoneData::new("arm", Some(0)).at(10.0, 0.0).rotated(90.0).with_length(5.0),
            ],
            vec![SlotData::new("hand", 1).with_attachment("hand")],
        );
        data.attach(0, RigAttachment::Region(RegionAttachment::new("hand", "hand.png", 2.0, 2.0)));
        Arc::new(data)
    }

    #[test]
    fn child_bones_compose_parent_transform() {
        let skeleton = RigSkeleton::new(two_bone_arm());
        let arm = skeleton.bone(1);
        assert!((arm.world_x - 110.0).abs() < 1e-4);
        assert!((arm.world_y - 50.0).abs() < 1e-4);
        let (tx, ty) = arm.tip();
        assert!((tx - 110.0).abs() < 1e-4);
        assert!((ty - 55.0).abs() < 1e-4);
    }

    #[test]
    fn region_world_vertices_follow_bone() {
        let skeleton = RigSkeleton::new(two_bone_arm());
        let slot = skeleton.slot(0);
        let attachment = slot.attachment.unwrap();
        let mut out = Vec::new();
        RigResolver.world_vertices(&skeleton, 0, attachment, &mut out);
        assert_eq!(out.len(), 8);
        let (cx, cy) = (
            out.iter().step_by(2).sum::<f32>() / 4.0,
            out.iter().skip(1).step_by(2).sum::<f32>() / 4.0,
        );
        assert!((cx - 110.0).abs() < 1e-4 && (cy - 50.0).abs() < 1e-4);
    }

    #[test]
    fn scale_applies_to_the_root() {
        let mut skeleton = RigSkeleton::new(two_bone_arm());
        skeleton.set_scale(2.0, 2.0);
        skeleton.update_world_transform();
        assert!((skeleton.bone(1).world_x - 220.0).abs() < 1e-4);
    }

    #[test]
    fn unknown_attachment_or_slot_is_rejected() {
        let mut skeleton = RigSkeleton::new(two_bone_arm());
        assert!(!skeleton.set_attachment("hand", "foot"));
        assert!(!skeleton.set_attachment("leg", "hand"));
        assert!(skeleton.set_attachment("hand", "hand"));
        assert!(!skeleton.set_skin("nope"));
    }
}
