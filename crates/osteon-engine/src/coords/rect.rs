use super::Vec2;

/// Axis-aligned rectangle (min corner + size).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            origin: min,
            size: max - min,
        }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Smallest rect containing every point of an interleaved `[x, y, ..]` buffer.
    ///
    /// Returns `None` for an empty buffer.
    pub fn bounding_interleaved(buf: &[f32]) -> Option<Rect> {
        let mut bounds = Bounds::default();
        bounds.extend_interleaved(buf);
        bounds.rect()
    }
}

/// Incremental min/max accumulator used to build bounding rects.
#[derive(Debug, Copy, Clone)]
pub struct Bounds {
    min: Vec2,
    max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec2::new(f32::INFINITY, f32::INFINITY),
            max: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }
}

impl Bounds {
    #[inline]
    pub fn include(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn extend_interleaved(&mut self, buf: &[f32]) {
        for pair in buf.chunks_exact(2) {
            self.include(Vec2::new(pair[0], pair[1]));
        }
    }

    /// `None` until at least one point was included.
    pub fn rect(&self) -> Option<Rect> {
        if self.min.x > self.max.x || self.min.y > self.max.y {
            None
        } else {
            Some(Rect::from_min_max(self.min, self.max))
        }
    }
}
