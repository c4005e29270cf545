/// Slot blend mode, as authored on the skeleton.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

/// GPU blend factor. Mirrors the subset of fixed-function factors the pipeline emits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusSrcColor,
}

/// `(source, destination)` factor pair.
///
/// `(One, Zero)` is the "blending disabled" pair; the executor maps it to `blend: None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    pub const DISABLED: BlendFunc = BlendFunc::new(BlendFactor::One, BlendFactor::Zero);

    #[inline]
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self { src, dst }
    }

    #[inline]
    pub fn is_disabled(self) -> bool {
        self == Self::DISABLED
    }
}

impl BlendMode {
    /// Deterministic factor pair for this mode. Atlas pages are premultiplied.
    pub const fn blend_func(self) -> BlendFunc {
        use BlendFactor::*;
        match self {
            BlendMode::Normal => BlendFunc::new(One, OneMinusSrcAlpha),
            BlendMode::Additive => BlendFunc::new(One, One),
            BlendMode::Multiply => BlendFunc::new(DstColor, OneMinusSrcColor),
            BlendMode::Screen => BlendFunc::new(SrcAlpha, OneMinusSrcAlpha),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_map_to_distinct_pairs() {
        let pairs = [
            BlendMode::Normal.blend_func(),
            BlendMode::Additive.blend_func(),
            BlendMode::Multiply.blend_func(),
            BlendMode::Screen.blend_func(),
        ];
        for (i, a) in pairs.iter().enumerate() {
            for b in &pairs[i + 1..] {
                assert_ne!(a, b);
            }
            assert!(!a.is_disabled());
        }
    }

    #[test]
    fn additive_is_one_one() {
        assert_eq!(
            BlendMode::Additive.blend_func(),
            BlendFunc::new(BlendFactor::One, BlendFactor::One)
        );
    }
}
