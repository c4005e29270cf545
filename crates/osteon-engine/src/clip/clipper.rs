use crate::coords::Vec2;

use super::convex_decompose;

/// Geometry produced by [`Clipper::clip_triangles`]. Buffers are reused between calls.
#[derive(Debug, Clone, Default)]
pub struct ClippedGeometry {
    /// Interleaved world positions.
    pub vertices: Vec<f32>,
    /// Interleaved texture coordinates, one pair per vertex.
    pub uvs: Vec<f32>,
    pub indices: Vec<u16>,
    /// Output needed more vertices than a `u16` index can address; geometry is truncated.
    pub overflowed: bool,
}

impl ClippedGeometry {
    fn clear(&mut self) {
        self.vertices.clear();
        self.uvs.clear();
        self.indices.clear();
        self.overflowed = false;
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_vertex(&mut self, p: Vec2, uv: Vec2) -> Option<u16> {
        let index = self.vertex_count();
        if index > u16::MAX as usize {
            self.overflowed = true;
            return None;
        }
        self.vertices.extend_from_slice(&[p.x, p.y]);
        self.uvs.extend_from_slice(&[uv.x, uv.y]);
        Some(index as u16)
    }
}

#[derive(Debug, Copy, Clone)]
struct ActiveRegion {
    slot: usize,
    end_slot: Option<usize>,
}

/// Single-region clipper.
///
/// At most one region is active. It is entered by a clipping attachment and left when
/// its end slot has been processed (`clip_end_slot`) or at the end of the frame
/// (`clip_end`).
#[derive(Debug, Default)]
pub struct Clipper {
    active: Option<ActiveRegion>,
    parts: Vec<Vec<Vec2>>,

    output: ClippedGeometry,
    remap: Vec<Option<u16>>,
    poly_in: Vec<Vec2>,
    poly_out: Vec<Vec2>,
}

impl Clipper {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_clipping(&self) -> bool {
        self.active.is_some()
    }

    /// Slot that opened the active region.
    pub fn active_slot(&self) -> Option<usize> {
        self.active.map(|a| a.slot)
    }

    /// Convex parts of the active region.
    pub fn parts(&self) -> &[Vec<Vec2>] {
        &self.parts
    }

    /// Activates clipping against `polygon` (interleaved world positions, any winding).
    ///
    /// Ignored while a region is already active. Returns whether a region was started.
    pub fn clip_start(&mut self, slot: usize, end_slot: Option<usize>, polygon: &[f32]) -> bool {
        if self.active.is_some() {
            log::trace!("clip start on slot {slot} ignored: already clipping");
            return false;
        }

        let points: Vec<Vec2> = (0..polygon.len() / 2)
            .map(|i| Vec2::from_interleaved(polygon, i))
            .collect();
        self.parts = convex_decompose(&points);
        if self.parts.is_empty() {
            log::trace!("clip polygon on slot {slot} has no area");
            return false;
        }

        self.active = Some(ActiveRegion { slot, end_slot });
        true
    }

    /// Ends clipping when `slot` is the active region's end slot.
    pub fn clip_end_slot(&mut self, slot: usize) {
        if self.active.is_some_and(|a| a.end_slot == Some(slot)) {
            self.clip_end();
        }
    }

    pub fn clip_end(&mut self) {
        self.active = None;
        self.parts.clear();
    }

    /// Clips an indexed triangle list against the active region.
    ///
    /// Triangles inside a convex part keep their vertices (shared through an index
    /// remap); if every triangle is inside, the input is returned as-is. Triangles
    /// outside all parts are dropped. Straddling triangles are clipped per part and
    /// fan-triangulated, with UVs interpolated barycentrically.
    ///
    /// When not clipping, the input is copied through unchanged.
    pub fn clip_triangles(&mut self, vertices: &[f32], indices: &[u16], uvs: &[f32]) -> &ClippedGeometry {
        self.output.clear();

        let vertex_count = vertices.len() / 2;
        let tri_count = indices.len() / 3;
        let valid = |i: u16| (i as usize) < vertex_count;

        let all_inside = self.active.is_none()
            || (0..tri_count).all(|t| {
                let tri = &indices[t * 3..t * 3 + 3];
                tri.iter().all(|&i| valid(i))
                    && self.part_containing(vertices, tri).is_some()
            });

        if all_inside {
            self.output.vertices.extend_from_slice(vertices);
            self.output.uvs.extend_from_slice(uvs);
            self.output.indices.extend_from_slice(&indices[..tri_count * 3]);
            return &self.output;
        }

        self.remap.clear();
        self.remap.resize(vertex_count, None);

        for t in 0..tri_count {
            let tri = [indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]];
            if !tri.iter().all(|&i| valid(i)) {
                continue;
            }

            if self.part_containing(vertices, &tri).is_some() {
                for &i in &tri {
                    let Some(mapped) = self.remapped(vertices, uvs, i) else {
                        return &self.output;
                    };
                    self.output.indices.push(mapped);
                }
                continue;
            }

            let corners = tri.map(|i| Vec2::from_interleaved(vertices, i as usize));
            let corner_uvs = tri.map(|i| uv_at(uvs, i as usize));

            for p in 0..self.parts.len() {
                if outside_part(&self.parts[p], &corners) {
                    continue;
                }
                self.poly_in.clear();
                self.poly_in.extend_from_slice(&corners);
                sutherland_hodgman(&self.parts[p], &mut self.poly_in, &mut self.poly_out);
                if self.poly_in.len() < 3 {
                    continue;
                }

                let base = self.output.vertex_count();
                for k in 0..self.poly_in.len() {
                    let q = self.poly_in[k];
                    let uv = interpolate_uv(q, corners, corner_uvs);
                    if self.output.push_vertex(q, uv).is_none() {
                        return &self.output;
                    }
                }
                for k in 1..self.poly_in.len() - 1 {
                    // push_vertex succeeded for every point, so these fit in u16.
                    self.output.indices.extend_from_slice(&[
                        base as u16,
                        (base + k) as u16,
                        (base + k + 1) as u16,
                    ]);
                }
            }
        }

        &self.output
    }

    fn remapped(&mut self, vertices: &[f32], uvs: &[f32], i: u16) -> Option<u16> {
        if let Some(mapped) = self.remap[i as usize] {
            return Some(mapped);
        }
        let p = Vec2::from_interleaved(vertices, i as usize);
        let mapped = self.output.push_vertex(p, uv_at(uvs, i as usize))?;
        self.remap[i as usize] = Some(mapped);
        Some(mapped)
    }

    fn part_containing(&self, vertices: &[f32], tri: &[u16]) -> Option<usize> {
        self.parts.iter().position(|part| {
            tri.iter()
                .all(|&i| inside_part(part, Vec2::from_interleaved(vertices, i as usize)))
        })
    }
}

#[inline]
fn uv_at(uvs: &[f32], i: usize) -> Vec2 {
    if uvs.len() >= i * 2 + 2 { Vec2::from_interleaved(uvs, i) } else { Vec2::zero() }
}

#[inline]
fn edge_side(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).cross(p - a)
}

fn inside_part(part: &[Vec2], p: Vec2) -> bool {
    let n = part.len();
    (0..n).all(|i| edge_side(part[i], part[(i + 1) % n], p) >= 0.0)
}

/// Cheap rejection: some edge of the part has every corner strictly on its outside.
fn outside_part(part: &[Vec2], corners: &[Vec2; 3]) -> bool {
    let n = part.len();
    (0..n).any(|i| {
        let (a, b) = (part[i], part[(i + 1) % n]);
        corners.iter().all(|&c| edge_side(a, b, c) < 0.0)
    })
}

/// Clips `poly` in place against a convex, positively wound `part`.
fn sutherland_hodgman(part: &[Vec2], poly: &mut Vec<Vec2>, scratch: &mut Vec<Vec2>) {
    let n = part.len();
    for e in 0..n {
        if poly.is_empty() {
            return;
        }
        let (a, b) = (part[e], part[(e + 1) % n]);

        scratch.clear();
        let m = poly.len();
        for k in 0..m {
            let cur = poly[k];
            let next = poly[(k + 1) % m];
            let dc = edge_side(a, b, cur);
            let dn = edge_side(a, b, next);

            if dc >= 0.0 {
                scratch.push(cur);
            }
            if (dc >= 0.0) != (dn >= 0.0) {
                let t = dc / (dc - dn);
                scratch.push(cur.lerp(next, t));
            }
        }
        std::mem::swap(poly, scratch);
    }
}

fn interpolate_uv(p: Vec2, tri: [Vec2; 3], uv: [Vec2; 3]) -> Vec2 {
    let [a, b, c] = tri;
    let denom = (b - a).cross(c - a);
    if denom.abs() <= f32::EPSILON {
        return uv[0];
    }
    let w1 = (p - a).cross(c - a) / denom;
    let w2 = (b - a).cross(p - a) / denom;
    let w0 = 1.0 - w1 - w2;
    uv[0] * w0 + uv[1] * w1 + uv[2] * w2
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [f32; 8] = [0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];

    fn quad(x: f32, y: f32, w: f32, h: f32) -> [f32; 8] {
        [x, y, x + w, y, x + w, y + h, x, y + h]
    }

    const QUAD_UVS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    const QUAD_IDX: [u16; 6] = [0, 1, 2, 2, 3, 0];

    fn clipping_square() -> Clipper {
        let mut c = Clipper::new();
        assert!(c.clip_start(0, Some(3), &SQUARE));
        c
    }

    #[test]
    fn fully_inside_geometry_is_returned_unchanged() {
        let mut c = clipping_square();
        let verts = quad(2.0, 2.0, 3.0, 3.0);
        let out = c.clip_triangles(&verts, &QUAD_IDX, &QUAD_UVS);

        assert_eq!(out.vertices, verts);
        assert_eq!(out.uvs, QUAD_UVS);
        assert_eq!(out.indices, QUAD_IDX);
    }

    #[test]
    fn fully_outside_geometry_is_dropped() {
        let mut c = clipping_square();
        let verts = quad(20.0, 20.0, 3.0, 3.0);
        let out = c.clip_triangles(&verts, &QUAD_IDX, &QUAD_UVS);
        assert!(out.is_empty());
        assert_eq!(out.vertex_count(), 0);
    }

    #[test]
    fn straddling_quad_is_cut_to_the_region() {
        let mut c = clipping_square();
        let verts = quad(5.0, 5.0, 10.0, 10.0);
        let out = c.clip_triangles(&verts, &QUAD_IDX, &QUAD_UVS);

        assert!(!out.is_empty());
        assert_eq!(out.indices.len() % 3, 0);
        for i in 0..out.vertex_count() {
            let p = Vec2::from_interleaved(&out.vertices, i);
            assert!(p.x >= 5.0 - 1e-4 && p.x <= 10.0 + 1e-4);
            assert!(p.y >= 5.0 - 1e-4 && p.y <= 10.0 + 1e-4);
            let uv = Vec2::from_interleaved(&out.uvs, i);
            // Quad spans 10 units for one UV unit; the kept corner is at uv (0,0).
            assert!((uv.x - (p.x - 5.0) / 10.0).abs() < 1e-4);
            assert!((uv.y - (p.y - 5.0) / 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn mixed_inside_triangles_share_vertices() {
        let mut c = clipping_square();
        // Two inside triangles sharing an edge plus one outside triangle.
        let verts = [1.0, 1.0, 4.0, 1.0, 4.0, 4.0, 1.0, 4.0, 30.0, 30.0, 31.0, 30.0, 31.0, 31.0];
        let idx = [0, 1, 2, 2, 3, 0, 4, 5, 6];
        let uvs = [0.0; 14];
        let out = c.clip_triangles(&verts, &idx, &uvs);

        assert_eq!(out.vertex_count(), 4);
        assert_eq!(out.indices.len(), 6);
    }

    #[test]
    fn start_while_clipping_is_ignored() {
        let mut c = clipping_square();
        assert!(!c.clip_start(1, Some(2), &quad(100.0, 100.0, 1.0, 1.0)));
        assert_eq!(c.active_slot(), Some(0));
    }

    #[test]
    fn end_slot_only_ends_its_own_region() {
        let mut c = clipping_square();
        c.clip_end_slot(2);
        assert!(c.is_clipping());
        c.clip_end_slot(3);
        assert!(!c.is_clipping());
        c.clip_end_slot(3);
        c.clip_end();
        assert!(!c.is_clipping());
    }

    #[test]
    fn degenerate_polygon_does_not_activate() {
        let mut c = Clipper::new();
        assert!(!c.clip_start(0, None, &[0.0, 0.0, 1.0, 1.0]));
        assert!(!c.clip_start(0, None, &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]));
        assert!(!c.is_clipping());
    }

    #[test]
    fn passthrough_when_not_clipping() {
        let mut c = Clipper::new();
        let verts = quad(50.0, 50.0, 1.0, 1.0);
        let out = c.clip_triangles(&verts, &QUAD_IDX, &QUAD_UVS);
        assert_eq!(out.indices, QUAD_IDX);
    }
}
