use crate::coords::{Bounds, Rect};
use crate::skeleton::{AttachmentKind, AttachmentResolver, Skeleton};

/// Axis-aligned bounds of every region and mesh attachment in the current pose.
///
/// Visibility is ignored (hidden slots still count) so the rect does not jump when a
/// slot fades out. Returns an empty rect when nothing contributes.
pub fn compute_bounds<S, R>(skeleton: &S, resolver: &R) -> Rect
where
    S: Skeleton,
    R: AttachmentResolver<S>,
{
    let mut bounds = Bounds::default();
    let mut world = Vec::new();

    for slot in 0..skeleton.slot_count() {
        let Some(attachment) = skeleton.slot(slot).attachment else { continue };
        match resolver.kind(attachment) {
            AttachmentKind::Region | AttachmentKind::Mesh => {
                resolver.world_vertices(skeleton, slot, attachment, &mut world);
                bounds.extend_interleaved(&world);
            }
            AttachmentKind::Clipping | AttachmentKind::Unknown => {}
        }
    }

    bounds.rect().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::paint::Color;
    use crate::rig::{
        BoneData, ClippingAttachment, MeshAttachment, RegionAttachment, RigAttachment,
        RigResolver, RigSkeleton, SkeletonData, SlotData,
    };

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn covers_regions_and_meshes_but_not_clips() {
        let bones = vec![BoneData::new("root", None)];
        let slots = vec![
            SlotData::new("region", 0).with_attachment("region"),
            SlotData::new("mask", 0).with_attachment("mask"),
            SlotData::new("mesh", 0).with_attachment("mesh"),
        ];
        let mut data = SkeletonData::new(bones, slots);
        data.attach(
            0,
            RigAttachment::Region(RegionAttachment::new("region", "p", 20.0, 10.0).at(-40.0, 0.0)),
        );
        data.attach(
            1,
            RigAttachment::Clipping(ClippingAttachment {
                name: "mask".into(),
                vertices: vec![-500.0, -500.0, 500.0, -500.0, 500.0, 500.0],
                end_slot: None,
            }),
        );
        data.attach(
            2,
            RigAttachment::Mesh(MeshAttachment {
                name: "mesh".into(),
                path: "p".into(),
                vertices: vec![0.0, 0.0, 50.0, 0.0, 50.0, 50.0],
                uvs: vec![0.0; 6],
                triangles: vec![0, 1, 2],
                color: Color::WHITE,
            }),
        );

        let mut skeleton = RigSkeleton::new(Arc::new(data));
        // Hidden slots still count.
        skeleton.set_slot_color(2, Color::TRANSPARENT);

        let rect = compute_bounds(&skeleton, &RigResolver);
        assert!(close(rect.min().x, -50.0) && close(rect.min().y, -5.0), "{rect:?}");
        assert!(close(rect.max().x, 50.0) && close(rect.max().y, 50.0), "{rect:?}");
    }

    #[test]
    fn empty_without_drawable_attachments() {
        let data = SkeletonData::new(
            vec![BoneData::new("root", None)],
            vec![SlotData::new("empty", 0)],
        );
        let skeleton = RigSkeleton::new(Arc::new(data));
        assert_eq!(compute_bounds(&skeleton, &RigResolver), Rect::default());
    }
}
