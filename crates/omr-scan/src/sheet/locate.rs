// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Block locator — finds the rectangular answer blocks in an edge map.
//
// Closed contours are traced, small ones are dropped as noise, each survivor
// is approximated by a polygon, and only four-vertex approximations of a
// plausible shape are kept. Candidates are ranked by enclosed area.

use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::point::Point;
use omr_core::VisionParams;
use tracing::{debug, instrument};

use super::geometry::{Corners, bounding_box, centroid, polygon_contains};

/// A four-cornered region that may be an answer block.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    /// Vertices of the approximated polygon, unordered.
    pub corners: Corners,
    /// Area enclosed by the traced contour (px²).
    pub area: f64,
}

impl Quad {
    pub fn centroid(&self) -> (f64, f64) {
        centroid(&self.corners)
    }

    /// `(min_x, min_y, max_x, max_y)` of the corners.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        bounding_box(&self.corners)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        polygon_contains(&self.corners, x, y)
    }
}

/// Filters and ranks closed contours into answer-block candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLocator {
    min_area: f64,
    epsilon_ratio: f64,
    min_aspect: f64,
    max_aspect: f64,
}

impl BlockLocator {
    pub fn new(params: &VisionParams) -> Self {
        Self {
            min_area: params.min_contour_area,
            epsilon_ratio: params.approx_epsilon_ratio,
            min_aspect: params.min_block_aspect,
            max_aspect: params.max_block_aspect,
        }
    }

    /// All rectangular candidates in `edge_map`, largest first.
    ///
    /// An edge loop yields both an outer and an inner boundary, and the
    /// bubbles of a block may themselves look rectangular. A candidate whose
    /// centroid falls inside a larger accepted candidate is therefore dropped,
    /// so one printed block produces exactly one quad.
    #[instrument(skip_all, fields(width = edge_map.width(), height = edge_map.height()))]
    pub fn locate(&self, edge_map: &GrayImage) -> Vec<Quad> {
        let contours = find_contours::<i32>(edge_map);
        debug!(contours = contours.len(), "contours traced");

        let mut candidates: Vec<Quad> = contours
            .iter()
            .filter_map(|contour| self.candidate(&contour.points))
            .collect();
        candidates.sort_by(|a, b| b.area.total_cmp(&a.area));

        let mut accepted: Vec<Quad> = Vec::new();
        for candidate in candidates {
            let (cx, cy) = candidate.centroid();
            if accepted.iter().any(|outer| outer.contains(cx, cy)) {
                continue;
            }
            accepted.push(candidate);
        }

        debug!(candidates = accepted.len(), "rectangular candidates kept");
        accepted
    }

    /// Turn one contour into a candidate, or reject it.
    fn candidate(&self, points: &[Point<i32>]) -> Option<Quad> {
        let area = contour_area(points);
        if area < self.min_area {
            return None;
        }

        let perimeter = arc_length(points, true);
        let epsilon = self.epsilon_ratio * perimeter;
        if epsilon <= 0.0 {
            return None;
        }

        let approx = approximate_closed_polygon(points, epsilon);
        let corners: Corners = approx.try_into().ok()?;

        let (x0, y0, x1, y1) = bounding_box(&corners);
        let (w, h) = ((x1 - x0) as f64, (y1 - y0) as f64);
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        let aspect = w / h;
        if aspect < self.min_aspect || aspect > self.max_aspect {
            return None;
        }

        Some(Quad { corners, area })
    }
}

/// Douglas–Peucker simplification of a closed contour.
///
/// The ring is cut at its first point and at the point farthest from it;
/// both open halves are simplified and joined back into a ring without the
/// duplicated cut points.
pub fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let distance_sq = |p: &Point<i32>| {
        let (dx, dy) = ((p.x - first.x) as i64, (p.y - first.y) as i64);
        dx * dx + dy * dy
    };
    let mut far = 0;
    for (i, p) in points.iter().enumerate() {
        if distance_sq(p) > distance_sq(&points[far]) {
            far = i;
        }
    }
    if far == 0 {
        return vec![first];
    }

    let mut ring = approximate_polygon_dp(&points[..=far], epsilon, false);
    let mut back_half: Vec<Point<i32>> = points[far..].to_vec();
    back_half.push(first);
    let tail = approximate_polygon_dp(&back_half, epsilon, false);

    // `ring` ends at the far point and `tail` starts there; `tail` ends at
    // the first point, which `ring` already starts with.
    ring.pop();
    ring.extend(tail);
    ring.pop();
    ring
}
