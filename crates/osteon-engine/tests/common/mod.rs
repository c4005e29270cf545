#![allow(dead_code)]

use std::sync::Arc;

use osteon_engine::paint::Color;
use osteon_engine::rig::{
    BoneData, ClippingAttachment, MeshAttachment, RegionAttachment, RigAttachment, RigSkeleton,
    SkeletonData, SlotData,
};
use osteon_engine::texture::{TextureImage, TextureRegistry};

pub const PAGE: &str = "test/page.png";

pub const SLOT_REGION: usize = 0;
pub const SLOT_MASK: usize = 1;
pub const SLOT_MESH: usize = 2;

/// 50x50 quad mesh split into two triangles, in root bone space.
pub fn quad_mesh() -> MeshAttachment {
    MeshAttachment {
        name: "mesh".into(),
        path: PAGE.into(),
        vertices: vec![0.0, 0.0, 50.0, 0.0, 50.0, 50.0, 0.0, 50.0],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        triangles: vec![0, 1, 2, 2, 3, 0],
        color: Color::WHITE,
    }
}

/// Region slot, then a clip mask equal to the mesh bounds, then the mesh it ends on.
pub fn masked_rig() -> SkeletonData {
    let bones = vec![BoneData::new("root", None)];
    let slots = vec![
        SlotData::new("region", 0).with_attachment("region"),
        SlotData::new("mask", 0).with_attachment("mask"),
        SlotData::new("mesh", 0).with_attachment("mesh"),
    ];

    let mut data = SkeletonData::new(bones, slots);
    data.attach(
        SLOT_REGION,
        RigAttachment::Region(RegionAttachment::new("region", PAGE, 20.0, 10.0).at(-40.0, 0.0)),
    );
    data.attach(
        SLOT_MASK,
        RigAttachment::Clipping(ClippingAttachment {
            name: "mask".into(),
            vertices: vec![0.0, 0.0, 50.0, 0.0, 50.0, 50.0, 0.0, 50.0],
            end_slot: Some(SLOT_MESH),
        }),
    );
    data.attach(SLOT_MESH, RigAttachment::Mesh(quad_mesh()));
    data
}

pub fn skeleton(data: SkeletonData) -> RigSkeleton {
    RigSkeleton::new(Arc::new(data))
}

pub fn textures(paths: &[&str]) -> TextureRegistry {
    let registry = TextureRegistry::new();
    for path in paths {
        registry.register(*path, TextureImage::solid(2, 2, [255, 255, 255, 255]).unwrap());
    }
    registry
}
