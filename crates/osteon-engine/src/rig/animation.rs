use crate::paint::Color;

use super::RigSkeleton;

/// Keyframed property curve. Keys are `(time_seconds, value)` sorted by time.
#[derive(Debug, Clone, PartialEq)]
pub enum Timeline {
    /// Degrees added to the setup rotation.
    Rotate { bone: usize, keys: Vec<(f32, f32)> },
    /// Offset added to the setup position.
    Translate { bone: usize, keys: Vec<(f32, [f32; 2])> },
    Color { slot: usize, keys: Vec<(f32, Color)> },
    /// Stepped; `None` hides the slot.
    Attachment { slot: usize, keys: Vec<(f32, Option<String>)> },
    /// Stepped; `None` restores setup order.
    DrawOrder { keys: Vec<(f32, Option<Vec<usize>>)> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub duration: f32,
    pub timelines: Vec<Timeline>,
}

/// Segment `(i, t)` such that the value lies between `keys[i]` and `keys[i + 1]` at `t`.
fn segment<T>(keys: &[(f32, T)], time: f32) -> Option<(usize, f32)> {
    let last = keys.len().checked_sub(1)?;
    if time <= keys[0].0 {
        return Some((0, 0.0));
    }
    if time >= keys[last].0 {
        return Some((last, 0.0));
    }
    let i = keys.partition_point(|k| k.0 <= time) - 1;
    let span = keys[i + 1].0 - keys[i].0;
    let t = if span > 0.0 { (time - keys[i].0) / span } else { 0.0 };
    Some((i, t))
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn sample_f32(keys: &[(f32, f32)], time: f32) -> Option<f32> {
    let (i, t) = segment(keys, time)?;
    let next = keys.get(i + 1).map_or(keys[i].1, |k| k.1);
    Some(lerp(keys[i].1, next, t))
}

fn sample_vec2(keys: &[(f32, [f32; 2])], time: f32) -> Option<[f32; 2]> {
    let (i, t) = segment(keys, time)?;
    let a = keys[i].1;
    let b = keys.get(i + 1).map_or(a, |k| k.1);
    Some([lerp(a[0], b[0], t), lerp(a[1], b[1], t)])
}

fn sample_color(keys: &[(f32, Color)], time: f32) -> Option<Color> {
    let (i, t) = segment(keys, time)?;
    let a = keys[i].1;
    let b = keys.get(i + 1).map_or(a, |k| k.1);
    Some(mix_color(a, b, t))
}

fn mix_color(a: Color, b: Color, t: f32) -> Color {
    Color::new(lerp(a.r, b.r, t), lerp(a.g, b.g, t), lerp(a.b, b.b, t), lerp(a.a, b.a, t))
}

fn step<T>(keys: &[(f32, T)], time: f32) -> Option<&T> {
    let i = keys.partition_point(|k| k.0 <= time);
    keys.get(i.checked_sub(1)?).map(|k| &k.1)
}

impl Animation {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            timelines: Vec::new(),
        }
    }

    pub fn with(mut self, timeline: Timeline) -> Self {
        self.timelines.push(timeline);
        self
    }

    /// Local time for a track time, wrapping when looping.
    pub fn local_time(&self, time: f32, looping: bool) -> f32 {
        if looping && self.duration > 0.0 {
            time.rem_euclid(self.duration)
        } else {
            time.min(self.duration)
        }
    }

    /// Poses `skeleton` at `time`, blending `alpha` of the way from the current pose.
    ///
    /// Stepped timelines (attachments, draw order) only apply once `alpha >= 0.5`.
    pub fn apply(&self, skeleton: &mut RigSkeleton, time: f32, looping: bool, alpha: f32) {
        let time = self.local_time(time, looping);
        let data = std::sync::Arc::clone(skeleton.data());

        for timeline in &self.timelines {
            match timeline {
                Timeline::Rotate { bone, keys } => {
                    let (Some(v), Some(b), Some(setup)) =
                        (sample_f32(keys, time), skeleton.bones.get_mut(*bone), data.bones.get(*bone))
                    else {
                        continue;
                    };
                    b.rotation = lerp(b.rotation, setup.rotation + v, alpha);
                }
                Timeline::Translate { bone, keys } => {
                    let (Some(v), Some(b), Some(setup)) =
                        (sample_vec2(keys, time), skeleton.bones.get_mut(*bone), data.bones.get(*bone))
                    else {
                        continue;
                    };
                    b.x = lerp(b.x, setup.x + v[0], alpha);
                    b.y = lerp(b.y, setup.y + v[1], alpha);
                }
                Timeline::Color { slot, keys } => {
                    let (Some(v), Some(s)) = (sample_color(keys, time), skeleton.slots.get_mut(*slot))
                    else {
                        continue;
                    };
                    s.color = mix_color(s.color, v, alpha);
                }
                Timeline::Attachment { slot, keys } => {
                    if alpha < 0.5 {
                        continue;
                    }
                    if let Some(name) = step(keys, time) {
                        skeleton.set_slot_attachment(*slot, name.as_deref());
                    }
                }
                Timeline::DrawOrder { keys } => {
                    if alpha < 0.5 {
                        continue;
                    }
                    match step(keys, time) {
                        Some(Some(order)) if order.len() == skeleton.slots.len() => {
                            skeleton.draw_order.clone_from(order);
                        }
                        Some(None) => skeleton.draw_order = (0..skeleton.slots.len()).collect(),
                        _ => {}
                    }
                }
            }
        }
    }
}
