/// Straight-alpha RGBA color, channels nominally in `[0, 1]`.
///
/// Skeleton, slot and attachment colors are all of this type; the effective vertex
/// tint is their component-wise product (see [`Color::modulate`]).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from `0`–`255` channel bytes.
    #[inline]
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Component-wise product, used to compose skeleton ⊙ slot ⊙ attachment tints.
    #[inline]
    pub fn modulate(self, other: Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b, self.a * other.a)
    }

    /// Returns the premultiplied `[r*a, g*a, b*a, a]` representation.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Clamps all channels to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulate_is_component_wise() {
        let a = Color::new(0.5, 1.0, 0.25, 0.8);
        let b = Color::new(0.5, 0.5, 1.0, 0.5);
        assert_eq!(a.modulate(b), Color::new(0.25, 0.5, 0.25, 0.4));
    }

    #[test]
    fn zero_alpha_anywhere_zeroes_the_product() {
        let tint = Color::WHITE
            .modulate(Color::new(1.0, 1.0, 1.0, 0.0))
            .modulate(Color::new(0.3, 0.3, 0.3, 1.0));
        assert!(tint.is_transparent());
    }

    #[test]
    fn from_bytes_maps_to_unit_range() {
        let c = Color::from_rgba_u8(0, 100, 0, 255);
        assert_eq!(c.a, 1.0);
        assert!((c.g - 100.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn premultiplied_scales_rgb() {
        assert_eq!(Color::new(1.0, 0.5, 0.0, 0.5).premultiplied(), [0.5, 0.25, 0.0, 0.5]);
    }
}
