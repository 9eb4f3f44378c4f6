// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering by sum/difference extremal scoring.

use std::cmp::Ordering;

use scanwerk_core::types::Point2D;

/// Assign corner roles to a set of points, returning
/// `[top_left, top_right, bottom_right, bottom_left]`.
///
/// - top-left minimises `x + y`, bottom-right maximises it;
/// - top-right minimises `y - x`, bottom-left maximises it.
///
/// Every role scans all points independently, so a degenerate input can
/// put one point in several roles. Ties go to the earliest point for both
/// minima and maxima. Any number of points is accepted: for polygons that
/// are not quadrilaterals this picks the four extremal vertices. Returns
/// `None` only for an empty slice.
pub fn sort_corners(points: &[Point2D]) -> Option<[Point2D; 4]> {
    let sum = |p: &Point2D| p.x + p.y;
    let diff = |p: &Point2D| p.y - p.x;

    Some([
        first_extreme(points, sum, Ordering::Less)?,
        first_extreme(points, diff, Ordering::Less)?,
        first_extreme(points, sum, Ordering::Greater)?,
        first_extreme(points, diff, Ordering::Greater)?,
    ])
}

/// First point whose score beats every later one in direction `wanted`.
///
/// `Iterator::max_by` keeps the last of equal maxima, so the scan is
/// written out to keep the first.
fn first_extreme(
    points: &[Point2D],
    score: impl Fn(&Point2D) -> f64,
    wanted: Ordering,
) -> Option<Point2D> {
    let mut iter = points.iter();
    let mut best = *iter.next()?;
    let mut best_score = score(&best);

    for p in iter {
        let s = score(p);
        if s.total_cmp(&best_score) == wanted {
            best = *p;
            best_score = s;
        }
    }

    Some(best)
}
