// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — contour extraction, candidate search, validation,
// perspective rectification and the file-based entry points.

pub mod contours;
pub mod corners;
pub mod detect;
pub mod document;
pub mod polygon;
pub mod rectify;
pub mod scanner;
pub mod validate;

pub use contours::{ContourExtractor, ContourSet, EdgeContourExtractor};
pub use corners::sort_corners;
pub use detect::{Detection, DocumentDetector};
pub use document::ScannedDocument;
pub use polygon::approximate_polygon;
pub use rectify::{PerspectiveRectifier, inverse_projection, output_dimensions};
pub use scanner::{CoordinateHint, CropOutput, CropRequest, DocumentScanner, ScanOutput, resolve_path};
pub use validate::{QuadAssessment, QuadrilateralValidator};
