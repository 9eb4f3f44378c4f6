// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plausibility checks for a candidate document outline.
//
// The checks are deliberately cheap: a degenerate-shape test, a minimum edge
// length and a bound on how far opposite corners may drift from axis
// alignment. They are not a perspective model; strongly skewed documents are
// rejected and large non-document rectangles are accepted.

use scanwerk_core::config::ScanConfig;
use scanwerk_core::types::{ImageSize, Quadrilateral};

/// Outcome of the individual checks for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadAssessment {
    /// No edge collapses to zero width or zero height and all four corners
    /// are distinct points.
    pub normal_shape: bool,
    /// Every edge spans at least `minimum_size`.
    pub big_enough: bool,
    /// Every edge offset lies within `[-minimum_size, minimum_size]`.
    pub rectangular: bool,
    /// Size threshold derived from the working width.
    pub minimum_size: f64,
    /// Largest absolute edge offset.
    pub max_offset: f64,
}

impl QuadAssessment {
    /// True when all three checks pass.
    pub fn accepted(&self) -> bool {
        self.normal_shape && self.big_enough && self.rectangular
    }

    /// Score in `[0, 1]`: 0 for rejected candidates, otherwise higher the
    /// closer the outline is to an axis-aligned rectangle.
    pub fn score(&self) -> f64 {
        if !self.accepted() {
            return 0.0;
        }
        if self.minimum_size <= 0.0 {
            return 1.0;
        }
        (1.0 - self.max_offset / self.minimum_size).clamp(0.0, 1.0)
    }
}

/// Accepts or rejects quadrilaterals in working space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrilateralValidator {
    min_size_divisor: f64,
}

impl Default for QuadrilateralValidator {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl QuadrilateralValidator {
    pub fn new(min_size_divisor: f64) -> Self {
        Self { min_size_divisor }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.min_size_divisor)
    }

    /// `floor(working.width / divisor)`.
    pub fn minimum_size(&self, working: ImageSize) -> f64 {
        (f64::from(working.width) / self.min_size_divisor).floor()
    }

    /// Run every check and report the individual results.
    pub fn assess(&self, quad: &Quadrilateral, working: ImageSize) -> QuadAssessment {
        let [tl, tr, br, bl] = *quad.points();
        let min = self.minimum_size(working);

        // Zero-width top/bottom edge, zero-height left/right edge, or two
        // roles filled by the same point.
        let normal_shape = tl.x != tr.x
            && bl.x != br.x
            && tl.y != bl.y
            && tr.y != br.y
            && quad.has_distinct_corners();

        let big_enough = tr.x - tl.x >= min
            && br.x - bl.x >= min
            && bl.y - tl.y >= min
            && br.y - tr.y >= min;

        let offsets = [
            tl.x - bl.x, // left
            tr.x - br.x, // right
            tl.y - tr.y, // bottom
            br.y - bl.y, // top
        ];
        let rectangular = offsets.iter().all(|o| (-min..=min).contains(o));
        let max_offset = offsets.iter().fold(0.0_f64, |acc, o| acc.max(o.abs()));

        QuadAssessment {
            normal_shape,
            big_enough,
            rectangular,
            minimum_size: min,
            max_offset,
        }
    }

    /// True if `quad` is a plausible document outline for an image of the
    /// given working size.
    pub fn validate(&self, quad: &Quadrilateral, working: ImageSize) -> bool {
        self.assess(quad, working).accepted()
    }
}
