// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Scanwerk: points, sizes, contours and the document
// quadrilateral, plus the report handed back to the host application.

use serde::{Deserialize, Serialize};

/// A 2D point. Which space it lives in is carried by the owning type
/// (`Contour` is always working space, `Quadrilateral` is tagged).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Multiply both coordinates by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Coordinate space a set of points is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// The downscaled, fixed-height image used for contour analysis.
    Working,
    /// Pixel coordinates of the image as decoded from disk.
    Original,
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Relationship between the original image and the working space.
///
/// `ratio = original.height / working_height`; multiplying a working-space
/// coordinate by `ratio` yields the original-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingScale {
    pub original: ImageSize,
    pub working: ImageSize,
    pub ratio: f64,
}

impl WorkingScale {
    /// Compute the working scale for an image. Returns `None` for an empty
    /// image or a non-positive working height.
    pub fn for_image(original: ImageSize, working_height: f64) -> Option<Self> {
        if original.is_empty() || working_height <= 0.0 || !working_height.is_finite() {
            return None;
        }

        let ratio = f64::from(original.height) / working_height;
        // Truncate like an integer cast, absorbing division round-off first.
        let shrink = |v: u32| ((f64::from(v) / ratio + 1e-9).floor() as u32).max(1);

        Some(Self {
            original,
            working: ImageSize::new(shrink(original.width), shrink(original.height)),
            ratio,
        })
    }
}

/// A closed polygonal outline in working space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point2D>,
}

impl Contour {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area (absolute value of the shoelace sum).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice_area += a.x * b.y - b.x * a.y;
        }
        twice_area.abs() / 2.0
    }

    /// Length of the closed outline, including the closing segment.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.points[i].distance(&self.points[(i + 1) % n]))
            .sum()
    }
}

/// Four document corners in canonical order
/// `[top_left, top_right, bottom_right, bottom_left]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    points: [Point2D; 4],
    space: CoordinateSpace,
    /// Index of the contour this candidate came from (diagnostics only).
    contour_index: Option<usize>,
}

impl Quadrilateral {
    /// Build from points already in canonical order.
    pub fn new(points: [Point2D; 4], space: CoordinateSpace) -> Self {
        Self {
            points,
            space,
            contour_index: None,
        }
    }

    /// The identity quadrilateral covering a whole image, in original space.
    pub fn full_frame(size: ImageSize) -> Self {
        let (w, h) = (f64::from(size.width), f64::from(size.height));
        Self::new(
            [
                Point2D::new(0.0, 0.0),
                Point2D::new(w, 0.0),
                Point2D::new(w, h),
                Point2D::new(0.0, h),
            ],
            CoordinateSpace::Original,
        )
    }

    /// Build from named corners.
    pub fn from_corner_points(corners: &CornerPoints, space: CoordinateSpace) -> Self {
        Self::new(
            [
                corners.top_left,
                corners.top_right,
                corners.bottom_right,
                corners.bottom_left,
            ],
            space,
        )
    }

    pub fn with_contour_index(mut self, index: usize) -> Self {
        self.contour_index = Some(index);
        self
    }

    pub fn points(&self) -> &[Point2D; 4] {
        &self.points
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn contour_index(&self) -> Option<usize> {
        self.contour_index
    }

    pub fn top_left(&self) -> Point2D {
        self.points[0]
    }

    pub fn top_right(&self) -> Point2D {
        self.points[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.points[2]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.points[3]
    }

    /// Multiply every corner by `factor` and retag the result as `space`.
    pub fn scaled(&self, factor: f64, space: CoordinateSpace) -> Self {
        Self {
            points: self.points.map(|p| p.scaled(factor)),
            space,
            contour_index: self.contour_index,
        }
    }

    /// True when no two corners coincide.
    pub fn has_distinct_corners(&self) -> bool {
        (0..4).all(|i| (i + 1..4).all(|j| self.points[i] != self.points[j]))
    }

    pub fn to_corner_points(&self) -> CornerPoints {
        CornerPoints {
            top_left: self.top_left(),
            top_right: self.top_right(),
            bottom_right: self.bottom_right(),
            bottom_left: self.bottom_left(),
        }
    }
}

/// Named corners as exchanged with the host application.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerPoints {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_right: Point2D,
    pub bottom_left: Point2D,
}

/// Result of the detect entry point, shaped for the host overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    /// Whether a document outline was found.
    pub found: bool,
    /// Detected corners in original-image coordinates.
    pub corners: Option<CornerPoints>,
    /// Working-space width used for preview scaling.
    pub width_with_ratio: u32,
    /// Working-space height used for preview scaling.
    pub height_with_ratio: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl DetectionReport {
    pub fn new(scale: &WorkingScale, corners: Option<CornerPoints>) -> Self {
        Self {
            found: corners.is_some(),
            corners,
            width_with_ratio: scale.working.width,
            height_with_ratio: scale.working.height,
            original_width: scale.original.width,
            original_height: scale.original.height,
        }
    }
}
