// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Closed-polygon simplification (Ramer-Douglas-Peucker) for traced contours.

use scanwerk_core::types::{Contour, Point2D};

/// Approximate a closed contour with fewer vertices.
///
/// The ring is split at the vertex farthest from the first point, each of
/// the two chains is simplified with Ramer-Douglas-Peucker at `epsilon`,
/// and the chains are joined back into a ring. The returned polygon is
/// implicitly closed (the first vertex is not repeated at the end).
///
/// Contours with fewer than 3 points are returned unchanged.
pub fn approximate_polygon(contour: &Contour, epsilon: f64) -> Vec<Point2D> {
    let points = contour.points();
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let mut split = 0;
    let mut split_dist = 0.0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let d = first.distance(p);
        if d > split_dist {
            split_dist = d;
            split = i;
        }
    }

    if split == 0 {
        // Every point coincides with the first one.
        return vec![first];
    }

    let outward = simplify_chain(&points[..=split], epsilon);

    let mut back: Vec<Point2D> = points[split..].to_vec();
    back.push(first);
    let homeward = simplify_chain(&back, epsilon);

    // `outward` ends at the split vertex, `homeward` starts there and ends
    // back at the first vertex.
    let mut ring = outward;
    ring.extend_from_slice(&homeward[1..homeward.len() - 1]);
    ring
}

/// Ramer-Douglas-Peucker on an open chain; both endpoints are always kept.
fn simplify_chain(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, epsilon, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

fn rdp_recurse(points: &[Point2D], start: usize, end: usize, epsilon: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, epsilon, kept);
        rdp_recurse(points, max_idx, end, epsilon, kept);
    }
}

/// Distance from `p` to the line through `a` and `b` (or to `a` when they
/// coincide).
fn perpendicular_distance(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(&a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
