use crate::coords::Vec2;

const CONVEX_EPS: f32 = 1e-6;

/// Twice the signed area. Positive for counter-clockwise winding in a +Y-up frame.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    let mut acc = 0.0;
    for i in 0..n {
        acc += points[i].cross(points[(i + 1) % n]);
    }
    acc
}

#[inline]
fn turn(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - b)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    (b - a).cross(p - a) >= 0.0 && (c - b).cross(p - b) >= 0.0 && (a - c).cross(p - c) >= 0.0
}

/// Ear-clipping triangulation of a simple polygon with positive winding.
///
/// Returns index triples into `points`. Self-intersecting input does not fail: when no
/// ear can be found the next vertex is clipped anyway, so the result always has
/// `n - 2` triangles for `n >= 3`.
pub fn triangulate(points: &[Vec2]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut ring: Vec<usize> = (0..n).collect();
    let mut out = Vec::with_capacity(n - 2);

    while ring.len() > 3 {
        let m = ring.len();
        let mut ear = None;

        for i in 0..m {
            let (prev, cur, next) = (ring[(i + m - 1) % m], ring[i], ring[(i + 1) % m]);
            let (a, b, c) = (points[prev], points[cur], points[next]);
            if turn(a, b, c) <= 0.0 {
                continue;
            }
            let blocked = ring.iter().any(|&k| {
                k != prev && k != cur && k != next && point_in_triangle(points[k], a, b, c)
            });
            if !blocked {
                ear = Some(i);
                break;
            }
        }

        let i = ear.unwrap_or(0);
        out.push([ring[(i + m - 1) % m], ring[i], ring[(i + 1) % m]]);
        ring.remove(i);
    }

    out.push([ring[0], ring[1], ring[2]]);
    out
}

fn is_convex(points: &[Vec2], poly: &[usize]) -> bool {
    let n = poly.len();
    (0..n).all(|i| {
        turn(points[poly[i]], points[poly[(i + 1) % n]], points[poly[(i + 2) % n]]) >= -CONVEX_EPS
    })
}

/// Merges a triangle into `part` across a shared edge if the result stays convex.
fn try_merge(points: &[Vec2], part: &mut Vec<usize>, tri: [usize; 3]) -> bool {
    let n = part.len();
    for i in 0..n {
        let (u, v) = (part[i], part[(i + 1) % n]);
        for k in 0..3 {
            // Both sides wind the same way, so a shared edge shows up reversed.
            if tri[k] == v && tri[(k + 1) % 3] == u {
                let w = tri[(k + 2) % 3];
                let mut merged = part.clone();
                merged.insert(i + 1, w);
                if is_convex(points, &merged) {
                    *part = merged;
                    return true;
                }
                return false;
            }
        }
    }
    false
}

/// Splits a polygon of any winding into convex parts with positive winding.
///
/// Ear-clips first, then greedily merges each triangle into the first part it shares an
/// edge with while convexity holds. Fewer than 3 points yields no parts.
pub fn convex_decompose(polygon: &[Vec2]) -> Vec<Vec<Vec2>> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    let mut points = polygon.to_vec();
    if signed_area(&points) < 0.0 {
        points.reverse();
    }

    let mut parts: Vec<Vec<usize>> = Vec::new();
    for tri in triangulate(&points) {
        if turn(points[tri[0]], points[tri[1]], points[tri[2]]).abs() <= CONVEX_EPS {
            // Zero-area ear from collinear or duplicated points.
            continue;
        }
        if !parts.iter_mut().any(|part| try_merge(&points, part, tri)) {
            parts.push(tri.to_vec());
        }
    }

    parts
        .into_iter()
        .map(|part| part.into_iter().map(|i| points[i]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn total_area(parts: &[Vec<Vec2>]) -> f32 {
        parts.iter().map(|p| signed_area(p) * 0.5).sum()
    }

    #[test]
    fn square_is_one_part_regardless_of_winding() {
        let ccw = [v(0.0, 0.0), v(4.0, 0.0), v(4.0, 4.0), v(0.0, 4.0)];
        let mut cw = ccw;
        cw.reverse();

        for poly in [&ccw[..], &cw[..]] {
            let parts = convex_decompose(poly);
            assert_eq!(parts.len(), 1);
            assert_eq!(parts[0].len(), 4);
            assert!((total_area(&parts) - 16.0).abs() < 1e-4);
        }
    }

    #[test]
    fn concave_polygon_splits_and_keeps_area() {
        // L shape, area 3.
        let l = [
            v(0.0, 0.0),
            v(2.0, 0.0),
            v(2.0, 1.0),
            v(1.0, 1.0),
            v(1.0, 2.0),
            v(0.0, 2.0),
        ];
        let parts = convex_decompose(&l);
        assert!(parts.len() >= 2);
        for part in &parts {
            let idx: Vec<usize> = (0..part.len()).collect();
            assert!(is_convex(part, &idx));
            assert!(signed_area(part) > 0.0);
        }
        assert!((total_area(&parts) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn triangulate_counts() {
        let pent = [v(0.0, 0.0), v(2.0, 0.0), v(3.0, 2.0), v(1.0, 3.0), v(-1.0, 2.0)];
        assert_eq!(triangulate(&pent).len(), 3);
        assert!(triangulate(&pent[..2]).is_empty());
    }

    #[test]
    fn too_few_points_has_no_parts() {
        assert!(convex_decompose(&[v(0.0, 0.0), v(1.0, 1.0)]).is_empty());
    }
}
