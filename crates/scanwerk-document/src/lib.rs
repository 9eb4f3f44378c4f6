// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Document detection and rectification for Scanwerk.
//
// Finds the quadrilateral outline of a photographed document, checks that it
// is plausible, and warps the region inside it into an upright rectangle.
// Image decoding and JPEG/PNG encoding live in `image`.

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `scanwerk_document::DocumentScanner` etc.
pub use self::image::processor::ImageProcessor;
pub use scan::{
    ContourExtractor, ContourSet, CoordinateHint, CropOutput, CropRequest, Detection,
    DocumentDetector, DocumentScanner, EdgeContourExtractor, PerspectiveRectifier,
    QuadrilateralValidator, ScanOutput, ScannedDocument, resolve_path,
};
