// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry helpers — corner ordering, centroid, containment, and
// the four-point perspective map used to rectify answer blocks.

use imageproc::geometric_transformations::Projection;
use imageproc::point::Point;

/// Four corners as produced by polygon approximation, in no particular order.
pub type Corners = [Point<i32>; 4];

/// Order four corners as `[top_left, top_right, bottom_left, bottom_right]`.
///
/// - top-left minimises `x + y`
/// - bottom-right maximises `x + y`
/// - top-right maximises `x - y`
/// - bottom-left minimises `x - y`
///
/// Ties go to the earliest input point. Returns `None` when the four picks
/// are not four distinct input points, which happens for collinear,
/// repeated, or 45°-rotated corners.
pub fn canonicalize_quad(points: &Corners) -> Option<Corners> {
    let sum = |p: &Point<i32>| p.x + p.y;
    let diff = |p: &Point<i32>| p.x - p.y;

    let top_left = arg_best(points, |a, b| sum(a) < sum(b));
    let bottom_right = arg_best(points, |a, b| sum(a) > sum(b));
    let top_right = arg_best(points, |a, b| diff(a) > diff(b));
    let bottom_left = arg_best(points, |a, b| diff(a) < diff(b));

    let picks = [top_left, top_right, bottom_left, bottom_right];
    for i in 0..picks.len() {
        for j in (i + 1)..picks.len() {
            if picks[i] == picks[j] {
                return None;
            }
        }
    }

    Some(picks.map(|i| points[i]))
}

/// Index of the first point that no later point beats.
fn arg_best(points: &Corners, better: impl Fn(&Point<i32>, &Point<i32>) -> bool) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        if better(p, &points[best]) {
            best = i;
        }
    }
    best
}

/// Homography taking canonical corners onto the rectangle
/// `(0,0) (w,0) (0,h) (w,h)`.
///
/// Returns `None` when any three corners are collinear or coincident.
pub fn perspective_map(canonical: &Corners, width: u32, height: u32) -> Option<Projection> {
    if has_collinear_triple(canonical) {
        return None;
    }
    let (w, h) = (width as f32, height as f32);
    let src = canonical.map(|p| (p.x as f32, p.y as f32));
    let dst = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];
    Projection::from_control_points(src, dst)
}

fn has_collinear_triple(points: &Corners) -> bool {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    TRIPLES.iter().any(|&(a, b, c)| {
        let (pa, pb, pc) = (points[a], points[b], points[c]);
        let cross = (pb.x - pa.x) as i64 * (pc.y - pa.y) as i64
            - (pb.y - pa.y) as i64 * (pc.x - pa.x) as i64;
        cross == 0
    })
}

/// Mean of the vertices.
pub fn centroid(points: &[Point<i32>]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    (sx / n, sy / n)
}

/// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
pub fn bounding_box(points: &[Point<i32>]) -> (i32, i32, i32, i32) {
    points.iter().fold(
        (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
        |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    )
}

/// Even-odd ray casting test.
pub fn polygon_contains(polygon: &[Point<i32>], x: f64, y: f64) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i].x as f64, polygon[i].y as f64);
        let (xj, yj) = (polygon[j].x as f64, polygon[j].y as f64);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(points: [(i32, i32); 4]) -> Corners {
        points.map(|(x, y)| Point::new(x, y))
    }

    /// All 24 orderings of four items.
    fn permutations(items: Corners) -> Vec<Corners> {
        let mut out = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                for c in 0..4 {
                    for d in 0..4 {
                        let idx = [a, b, c, d];
                        let mut seen = [false; 4];
                        if idx.iter().all(|&i| !std::mem::replace(&mut seen[i], true)) {
                            out.push(idx.map(|i| items[i]));
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn skewed_quad_is_ordered_tl_tr_bl_br() {
        let q = quad([(410, 1090), (52, 95), (30, 1110), (390, 80)]);
        let ordered = canonicalize_quad(&q).expect("non-degenerate");
        assert_eq!(
            ordered,
            quad([(52, 95), (390, 80), (30, 1110), (410, 1090)])
        );
    }

    #[test]
    fn every_permutation_gives_the_same_order() {
        let q = quad([(12, 20), (300, 8), (25, 410), (318, 400)]);
        let expected = canonicalize_quad(&q).expect("non-degenerate");
        let perms = permutations(q);
        assert_eq!(perms.len(), 24);
        for p in perms {
            assert_eq!(canonicalize_quad(&p), Some(expected));
        }
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let q = quad([(318, 400), (25, 410), (12, 20), (300, 8)]);
        let once = canonicalize_quad(&q).expect("non-degenerate");
        let twice = canonicalize_quad(&once).expect("non-degenerate");
        assert_eq!(once, twice);
    }

    #[test]
    fn repeated_points_are_degenerate() {
        let q = quad([(5, 5), (5, 5), (5, 5), (5, 5)]);
        assert!(canonicalize_quad(&q).is_none());
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let q = quad([(0, 0), (10, 10), (20, 20), (30, 30)]);
        assert!(canonicalize_quad(&q).is_none());
    }

    #[test]
    fn perspective_map_sends_corners_to_rectangle() {
        let canonical = quad([(10, 20), (110, 25), (5, 220), (115, 210)]);
        let projection = perspective_map(&canonical, 800, 1200).expect("valid quad");
        let expected = [(0.0, 0.0), (800.0, 0.0), (0.0, 1200.0), (800.0, 1200.0)];
        for (p, (ex, ey)) in canonical.iter().zip(expected) {
            let (x, y) = projection * (p.x as f32, p.y as f32);
            assert!((x - ex).abs() < 0.5 && (y - ey).abs() < 0.5, "{p:?} -> ({x}, {y})");
        }
    }

    #[test]
    fn perspective_map_rejects_collinear_corners() {
        let canonical = quad([(0, 0), (10, 0), (20, 0), (30, 0)]);
        assert!(perspective_map(&canonical, 800, 1200).is_none());
    }

    #[test]
    fn containment_and_centroid() {
        let rect = quad([(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert_eq!(centroid(&rect), (5.0, 5.0));
        assert!(polygon_contains(&rect, 5.0, 5.0));
        assert!(!polygon_contains(&rect, 15.0, 5.0));
        assert_eq!(bounding_box(&rect), (0, 0, 10, 10));
    }
}
