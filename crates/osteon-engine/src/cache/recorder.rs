use crate::batch::{DrawBatch, Vertex};
use crate::coords::{Projection, Rect, Vec2};
use crate::paint::{BlendFunc, Color};
use crate::texture::TextureId;

use super::{Command, ShaderKind};

/// Upper bound on geometry recorded for one frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheBudget {
    pub max_vertices: usize,
    pub max_indices: usize,
}

impl Default for CacheBudget {
    fn default() -> Self {
        Self {
            max_vertices: 1 << 18,
            max_indices: 3 << 18,
        }
    }
}

/// Commands and geometry arenas for exactly one frame.
///
/// Lifecycle: cleared when compilation starts, appended while compiling, replayed once,
/// cleared again for the next frame. Capacity is kept across clears.
#[derive(Debug, Default)]
pub struct CommandCache {
    commands: Vec<Command>,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    points: Vec<Vec2>,

    viewport: Rect,
    budget: CacheBudget,
    warned_budget: bool,
}

impl CommandCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(budget: CacheBudget) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    pub fn set_budget(&mut self, budget: CacheBudget) {
        self.budget = budget;
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.vertices.clear();
        self.indices.clear();
        self.points.clear();
        self.warned_budget = false;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// World rect captured by subsequent `BindShader` records.
    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
    }

    pub fn record(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn bind_shader(&mut self, kind: ShaderKind) {
        let projection = Projection::new(self.viewport);
        self.record(Command::BindShader { kind, projection });
    }

    pub fn blend_func(&mut self, func: BlendFunc) {
        self.record(Command::SetBlendFunc(func));
    }

    pub fn uniform_color(&mut self, color: Color) {
        self.record(Command::SetUniformColor(color));
    }

    pub fn line_width(&mut self, width: f32) {
        self.record(Command::SetLineWidth(width));
    }

    pub fn point_size(&mut self, size: f32) {
        self.record(Command::SetPointSize(size));
    }

    /// Copies geometry into the arenas and records a draw. Empty draws record nothing.
    pub fn draw_triangles(&mut self, texture: TextureId, vertices: &[Vertex], indices: &[u16]) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }
        let v0 = self.vertices.len() as u32;
        let i0 = self.indices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);

        self.record(Command::DrawTriangles {
            vertices: v0..self.vertices.len() as u32,
            indices: i0..self.indices.len() as u32,
            texture,
        });
    }

    /// Closed outline through `points`. Fewer than two points records nothing.
    pub fn draw_polygon(&mut self, points: &[Vec2]) {
        if points.len() < 2 {
            return;
        }
        let p0 = self.points.len() as u32;
        self.points.extend_from_slice(points);
        self.record(Command::DrawPolygonOutline {
            points: p0..self.points.len() as u32,
        });
    }

    pub fn draw_line(&mut self, from: Vec2, to: Vec2) {
        self.record(Command::DrawLineSegment { from, to });
    }

    pub fn draw_point(&mut self, p: Vec2) {
        self.record(Command::DrawPoint(p));
    }

    /// Records a frame's textured batches.
    ///
    /// One `BindShader(Textured)` precedes all draws. `SetBlendFunc` is recorded only
    /// before a batch that follows another recorded batch; the first real batch uses the
    /// baseline blend state set up by the executor. Empty batches are skipped without
    /// affecting that bookkeeping.
    pub fn record_batches(&mut self, batches: &[DrawBatch]) {
        if batches.iter().all(DrawBatch::is_empty) {
            return;
        }
        self.bind_shader(ShaderKind::Textured);

        let mut has_prior = false;
        for batch in batches.iter().filter(|b| !b.is_empty()) {
            if !self.fits(batch.vertices.len(), batch.indices.len()) {
                if !self.warned_budget {
                    log::warn!(
                        "command cache budget exceeded at slot {} ({} vertices, {} indices recorded); dropping remaining batches",
                        batch.slot,
                        self.vertices.len(),
                        self.indices.len()
                    );
                    self.warned_budget = true;
                }
                break;
            }

            if has_prior {
                self.blend_func(batch.blend_mode.blend_func());
            }
            self.draw_triangles(batch.texture, &batch.vertices, &batch.indices);
            has_prior = true;
        }
    }

    fn fits(&self, vertices: usize, indices: usize) -> bool {
        self.vertices.len() + vertices <= self.budget.max_vertices
            && self.indices.len() + indices <= self.budget.max_indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::BlendMode;

    fn batch(slot: usize, mode: BlendMode, empty: bool) -> DrawBatch {
        DrawBatch {
            vertices: vec![Vertex::default(); 3],
            indices: if empty { Vec::new() } else { vec![0, 1, 2] },
            texture: TextureId(0),
            blend_mode: mode,
            slot,
        }
    }

    fn count_blends(cache: &CommandCache) -> usize {
        cache
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::SetBlendFunc(_)))
            .count()
    }

    #[test]
    fn blend_only_between_real_batches() {
        let mut cache = CommandCache::new();
        cache.record_batches(&[
            batch(0, BlendMode::Normal, false),
            batch(1, BlendMode::Additive, true),
            batch(2, BlendMode::Additive, false),
            batch(3, BlendMode::Multiply, false),
        ]);

        assert_eq!(count_blends(&cache), 2);
        assert!(matches!(
            cache.commands()[0],
            Command::BindShader { kind: ShaderKind::Textured, .. }
        ));
        // First draw comes straight after the shader bind.
        assert!(matches!(cache.commands()[1], Command::DrawTriangles { .. }));
        assert_eq!(
            cache.commands()[2],
            Command::SetBlendFunc(BlendMode::Additive.blend_func())
        );
    }

    #[test]
    fn nothing_recorded_for_empty_frames() {
        let mut cache = CommandCache::new();
        cache.record_batches(&[]);
        cache.record_batches(&[batch(0, BlendMode::Normal, true)]);
        assert!(cache.is_empty());
    }

    #[test]
    fn geometry_is_copied_into_arenas() {
        let mut cache = CommandCache::new();
        let b = batch(0, BlendMode::Normal, false);
        cache.record_batches(std::slice::from_ref(&b));
        cache.record_batches(std::slice::from_ref(&b));
        drop(b);

        assert_eq!(cache.vertices().len(), 6);
        assert_eq!(cache.indices(), &[0, 1, 2, 0, 1, 2]);
        let draws: Vec<_> = cache
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::DrawTriangles { vertices, .. } => Some(vertices.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(draws, vec![0..3, 3..6]);
    }

    #[test]
    fn budget_stops_recording() {
        let mut cache = CommandCache::with_budget(CacheBudget {
            max_vertices: 4,
            max_indices: 100,
        });
        cache.record_batches(&[
            batch(0, BlendMode::Normal, false),
            batch(1, BlendMode::Normal, false),
        ]);
        let draws = cache.commands().iter().filter(|c| c.is_draw()).count();
        assert_eq!(draws, 1);
        assert_eq!(count_blends(&cache), 0);
    }

    #[test]
    fn clear_is_idempotent_and_keeps_viewport() {
        let mut cache = CommandCache::new();
        cache.set_viewport(Rect::new(0.0, 0.0, 10.0, 10.0));
        cache.draw_point(Vec2::zero());
        cache.clear();
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.points().is_empty());
        assert_eq!(cache.viewport(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn bind_shader_captures_viewport() {
        let mut cache = CommandCache::new();
        let rect = Rect::new(-5.0, -5.0, 10.0, 20.0);
        cache.set_viewport(rect);
        cache.bind_shader(ShaderKind::Flat);
        assert_eq!(
            cache.commands()[0],
            Command::BindShader { kind: ShaderKind::Flat, projection: Projection::new(rect) }
        );
    }
}
