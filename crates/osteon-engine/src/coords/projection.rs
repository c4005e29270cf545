use super::Rect;

/// Orthographic projection over a world-space rect.
///
/// `rect.origin` maps to the top-left of the render target, `rect.max()` to the
/// bottom-right. A degenerate rect falls back to a unit extent so the matrix stays finite.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Projection {
    pub rect: Rect,
}

impl Projection {
    #[inline]
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Column-major 4x4 matrix, ready for a WGSL `mat4x4<f32>` uniform.
    pub fn matrix(self) -> [[f32; 4]; 4] {
        let left = self.rect.origin.x;
        let top = self.rect.origin.y;
        let w = if self.rect.size.x.abs() > f32::EPSILON { self.rect.size.x } else { 1.0 };
        let h = if self.rect.size.y.abs() > f32::EPSILON { self.rect.size.y } else { 1.0 };

        let sx = 2.0 / w;
        let sy = -2.0 / h;
        let tx = -1.0 - left * sx;
        let ty = 1.0 - top * sy;

        [
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [tx, ty, 0.0, 1.0],
        ]
    }

    /// Applies the projection to a single point (CPU-side mirror of the shader).
    pub fn to_ndc(self, x: f32, y: f32) -> (f32, f32) {
        let m = self.matrix();
        (m[0][0] * x + m[3][0], m[1][1] * y + m[3][1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_to_ndc_corners() {
        let p = Projection::new(Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(p.to_ndc(10.0, 20.0), (-1.0, 1.0));
        assert_eq!(p.to_ndc(110.0, 70.0), (1.0, -1.0));
    }

    #[test]
    fn degenerate_rect_stays_finite() {
        let p = Projection::new(Rect::new(5.0, 5.0, 0.0, 0.0));
        let (x, y) = p.to_ndc(5.0, 5.0);
        assert!(x.is_finite() && y.is_finite());
    }
}
