use crate::paint::{BlendMode, Color};

use super::Animation;

pub const DEFAULT_SKIN: &str = "default";

#[derive(Debug, Clone, PartialEq)]
pub struct BoneData {
    pub name: String,
    /// Must precede this bone in `SkeletonData::bones`.
    pub parent: Option<usize>,
    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub length: f32,
}

impl BoneData {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            length: 0.0,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotData {
    pub name: String,
    pub bone: usize,
    pub color: Color,
    pub blend_mode: BlendMode,
    /// Setup-pose attachment name.
    pub attachment: Option<String>,
}

impl SlotData {
    pub fn new(name: impl Into<String>, bone: usize) -> Self {
        Self {
            name: name.into(),
            bone,
            color: Color::WHITE,
            blend_mode: BlendMode::Normal,
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, name: impl Into<String>) -> Self {
        self.attachment = Some(name.into());
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Axis-aligned textured quad centered on `(x, y)` in bone space.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAttachment {
    pub name: String,
    pub path: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    /// Corner UVs: top-left, top-right, bottom-right, bottom-left.
    pub uvs: [f32; 8],
    pub color: Color,
}

impl RegionAttachment {
    pub fn new(name: impl Into<String>, path: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            width,
            height,
            uvs: [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            color: Color::WHITE,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Bone-local corner positions, interleaved, in UV order.
    pub fn local_corners(&self) -> [f32; 8] {
        let (hw, hh) = (self.width * 0.5, self.height * 0.5);
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let mut out = [0.0; 8];
        for (i, (cx, cy)) in [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].into_iter().enumerate() {
            out[i * 2] = cx * cos - cy * sin + self.x;
            out[i * 2 + 1] = cx * sin + cy * cos + self.y;
        }
        out
    }
}

/// Unweighted mesh in bone space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAttachment {
    pub name: String,
    pub path: String,
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub triangles: Vec<u16>,
    pub color: Color,
}

/// Clip polygon in bone space, active until `end_slot` has been drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippingAttachment {
    pub name: String,
    pub vertices: Vec<f32>,
    pub end_slot: Option<usize>,
}

/// Hit-test polygon. Never drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxAttachment {
    pub name: String,
    pub vertices: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RigAttachment {
    Region(RegionAttachment),
    Mesh(MeshAttachment),
    Clipping(ClippingAttachment),
    BoundingBox(BoundingBoxAttachment),
}

impl RigAttachment {
    pub fn name(&self) -> &str {
        match self {
            RigAttachment::Region(a) => &a.name,
            RigAttachment::Mesh(a) => &a.name,
            RigAttachment::Clipping(a) => &a.name,
            RigAttachment::BoundingBox(a) => &a.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinEntry {
    pub slot: usize,
    pub attachment: RigAttachment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub name: String,
    pub entries: Vec<SkinEntry>,
}

impl Skin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, slot: usize, attachment: RigAttachment) -> Self {
        self.entries.push(SkinEntry { slot, attachment });
        self
    }

    pub fn find(&self, slot: usize, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.slot == slot && e.attachment.name() == name)
    }
}

/// Immutable skeleton definition shared by skeleton instances and the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonData {
    pub bones: Vec<BoneData>,
    pub slots: Vec<SlotData>,
    /// Index 0 is the default skin.
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
}

impl SkeletonData {
    pub fn new(bones: Vec<BoneData>, slots: Vec<SlotData>) -> Self {
        Self {
            bones,
            slots,
            skins: vec![Skin::new(DEFAULT_SKIN)],
            animations: Vec::new(),
        }
    }

    pub fn attach(&mut self, slot: usize, attachment: RigAttachment) {
        self.skins[0].entries.push(SkinEntry { slot, attachment });
    }

    pub fn add_skin(&mut self, skin: Skin) {
        self.skins.push(skin);
    }

    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    pub fn find_slot(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn find_skin(&self, name: &str) -> Option<usize> {
        self.skins.iter().position(|s| s.name == name)
    }

    pub fn find_animation(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_corners_follow_offset_and_rotation() {
        let r = RegionAttachment::new("r", "p.png", 2.0, 4.0).at(10.0, 0.0);
        assert_eq!(r.local_corners(), [9.0, -2.0, 11.0, -2.0, 11.0, 2.0, 9.0, 2.0]);

        let mut turned = RegionAttachment::new("r", "p.png", 2.0, 2.0);
        turned.rotation = 90.0;
        let c = turned.local_corners();
        // Top-left (-1,-1) rotated a quarter turn lands on (1,-1).
        assert!((c[0] - 1.0).abs() < 1e-5 && (c[1] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn skin_lookup_is_per_slot() {
        let skin = Skin::new("s")
            .with(0, RigAttachment::BoundingBox(BoundingBoxAttachment { name: "a".into(), vertices: vec![] }))
            .with(1, RigAttachment::BoundingBox(BoundingBoxAttachment { name: "a".into(), vertices: vec![] }));
        assert_eq!(skin.find(1, "a"), Some(1));
        assert_eq!(skin.find(2, "a"), None);
    }
}
