//! Minimal skeleton runtime implementing the collaborator traits.
//!
//! Bones are unweighted affine transforms, attachments are bone-local geometry, and
//! animations are linearly interpolated keyframe timelines. It is small enough to drive
//! tests and the demo binary.

mod animation;
mod data;
mod engine;
pub mod reference;
mod skeleton;

pub use animation::{Animation, Timeline};
pub use data::{
    BoneData, BoundingBoxAttachment, ClippingAttachment, MeshAttachment, RegionAttachment,
    RigAttachment, SkeletonData, Skin, SlotData,
};
pub use engine::RigEngine;
pub use skeleton::{RigResolver, RigSkeleton};
