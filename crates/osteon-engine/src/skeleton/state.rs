use crate::paint::{BlendMode, Color};

/// Read-only view of one slot for the current pose.
pub struct SlotState<'a, A> {
    pub name: &'a str,
    pub color: Color,
    pub blend_mode: BlendMode,
    pub bone: usize,
    pub bone_active: bool,
    pub attachment: Option<&'a A>,
}

impl<A> Clone for SlotState<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for SlotState<'_, A> {}

/// World transform of one bone, as needed for debug overlays.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BoneState {
    pub world_x: f32,
    pub world_y: f32,
    /// 2x2 world matrix `[a b; c d]`.
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub length: f32,
    pub active: bool,
}

impl BoneState {
    /// World position of the bone tip (`length` along the local x axis).
    #[inline]
    pub fn tip(&self) -> (f32, f32) {
        (
            self.length * self.a + self.world_x,
            self.length * self.c + self.world_y,
        )
    }
}

/// Posed skeleton state.
///
/// Slots are addressed by index. `draw_order` lists slot indices back-to-front.
pub trait Skeleton {
    type Attachment;

    /// Skeleton-wide tint.
    fn color(&self) -> Color;

    fn slot_count(&self) -> usize;

    /// Panics if `index >= slot_count()`.
    fn slot(&self, index: usize) -> SlotState<'_, Self::Attachment>;

    /// Slot indices in painter's order (back-to-front).
    fn draw_order(&self) -> &[usize];

    fn bone_count(&self) -> usize;

    /// Panics if `index >= bone_count()`.
    fn bone(&self, index: usize) -> BoneState;

    /// Recomputes bone world transforms from local transforms.
    fn update_world_transform(&mut self);

    fn set_to_setup_pose(&mut self) {
        self.set_bones_to_setup_pose();
        self.set_slots_to_setup_pose();
    }

    fn set_bones_to_setup_pose(&mut self);

    /// Restores slot colors, attachments and draw order.
    fn set_slots_to_setup_pose(&mut self);

    /// Looks `attachment` up in the active skin (then the default skin). `false` when
    /// either name is unknown.
    fn set_attachment(&mut self, slot: &str, attachment: &str) -> bool;

    fn set_skin(&mut self, skin: &str) -> bool;

    fn skin_names(&self) -> Vec<String>;

    fn set_scale(&mut self, x: f32, y: f32);
}
