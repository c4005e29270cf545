//! Small hand-built rig: a body, a masked arm, an additive glow and a hitbox.

use crate::paint::{BlendMode, Color};

use super::{
    Animation, BoneData, BoundingBoxAttachment, ClippingAttachment, MeshAttachment,
    RegionAttachment, RigAttachment, SkeletonData, Skin, SlotData, Timeline,
};

/// Atlas page every textured attachment of the reference rig samples.
pub const ATLAS_PAGE: &str = "reference/atlas.png";

pub const SLOT_BODY: usize = 0;
pub const SLOT_MASK: usize = 1;
pub const SLOT_ARM: usize = 2;
pub const SLOT_GLOW: usize = 3;
pub const SLOT_HITBOX: usize = 4;

fn arm_mesh(name: &str, color: Color) -> RigAttachment {
    // Two stacked quads along the bone, 20 wide and 60 long.
    RigAttachment::Mesh(MeshAttachment {
        name: name.into(),
        path: ATLAS_PAGE.into(),
        vertices: vec![
            0.0, -10.0, 30.0, -10.0, 60.0, -10.0, //
            0.0, 10.0, 30.0, 10.0, 60.0, 10.0,
        ],
        uvs: vec![
            0.5, 0.0, 0.75, 0.0, 1.0, 0.0, //
            0.5, 0.5, 0.75, 0.5, 1.0, 0.5,
        ],
        triangles: vec![0, 1, 4, 4, 3, 0, 1, 2, 5, 5, 4, 1],
        color,
    })
}

pub fn reference_rig() -> SkeletonData {
    let bones = vec![
        BoneData::new("root", None),
        BoneData::new("body", Some(0)).at(0.0, -60.0).rotated(-90.0).with_length(120.0),
        BoneData::new("arm", Some(1)).at(90.0, -30.0).rotated(-60.0).with_length(60.0),
        BoneData::new("head", Some(1)).at(120.0, 0.0).with_length(20.0),
    ];

    let slots = vec![
        SlotData::new("body", 1).with_attachment("body"),
        SlotData::new("mask", 1).with_attachment("mask"),
        SlotData::new("arm", 2).with_attachment("arm"),
        SlotData::new("glow", 3)
            .with_attachment("glow")
            .with_blend_mode(BlendMode::Additive)
            .with_color(Color::new(1.0, 0.9, 0.4, 0.8)),
        SlotData::new("hitbox", 0).with_attachment("hitbox"),
    ];

    let mut data = SkeletonData::new(bones, slots);

    data.attach(
        SLOT_BODY,
        RigAttachment::Region(RegionAttachment {
            uvs: [0.0, 0.0, 0.5, 0.0, 0.5, 1.0, 0.0, 1.0],
            ..RegionAttachment::new("body", ATLAS_PAGE, 120.0, 60.0).at(60.0, 0.0)
        }),
    );
    data.attach(
        SLOT_MASK,
        RigAttachment::Clipping(ClippingAttachment {
            name: "mask".into(),
            // Body-local, covers the upper body and a bit beyond the shoulder.
            vertices: vec![20.0, -70.0, 130.0, -70.0, 130.0, 40.0, 20.0, 40.0],
            end_slot: Some(SLOT_ARM),
        }),
    );
    data.attach(SLOT_ARM, arm_mesh("arm", Color::WHITE));
    data.attach(
        SLOT_GLOW,
        RigAttachment::Region(RegionAttachment {
            uvs: [0.5, 0.5, 1.0, 0.5, 1.0, 1.0, 0.5, 1.0],
            ..RegionAttachment::new("glow", ATLAS_PAGE, 40.0, 40.0).at(20.0, 0.0)
        }),
    );
    data.attach(
        SLOT_HITBOX,
        RigAttachment::BoundingBox(BoundingBoxAttachment {
            name: "hitbox".into(),
            vertices: vec![-40.0, -200.0, 40.0, -200.0, 40.0, 0.0, -40.0, 0.0],
        }),
    );

    data.add_skin(
        Skin::new("tinted")
            .with(SLOT_ARM, arm_mesh("arm", Color::new(0.6, 0.8, 1.0, 1.0))),
    );

    data.add_animation(
        Animation::new("wave", 1.0).with(Timeline::Rotate {
            bone: 2,
            keys: vec![(0.0, 0.0), (0.5, 40.0), (1.0, 0.0)],
        }),
    );
    data.add_animation(
        Animation::new("pulse", 0.8).with(Timeline::Color {
            slot: SLOT_GLOW,
            keys: vec![
                (0.0, Color::new(1.0, 0.9, 0.4, 0.8)),
                (0.4, Color::new(1.0, 0.9, 0.4, 0.2)),
                (0.8, Color::new(1.0, 0.9, 0.4, 0.8)),
            ],
        }),
    );
    data.add_animation(
        Animation::new("tuck", 0.5)
            .with(Timeline::Attachment { slot: SLOT_ARM, keys: vec![(0.0, None)] })
            .with(Timeline::DrawOrder {
                keys: vec![(0.0, Some(vec![SLOT_ARM, SLOT_BODY, SLOT_MASK, SLOT_GLOW, SLOT_HITBOX]))],
            }),
    );

    data
}
