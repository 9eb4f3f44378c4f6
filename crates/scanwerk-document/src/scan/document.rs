// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-call scan result: sizes, detected outline and the rectified image.

use image::RgbaImage;
use scanwerk_core::types::{CoordinateSpace, DetectionReport, ImageSize, Quadrilateral, WorkingScale};

/// Everything one scan produced.
///
/// Built once by `DocumentDetector::scan`; only the processed image can be
/// attached afterwards.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    scale: WorkingScale,
    preview: Option<Quadrilateral>,
    quadrilateral: Option<Quadrilateral>,
    processed: Option<RgbaImage>,
}

impl ScannedDocument {
    /// Wrap a working-space detection. The original-space outline is
    /// derived by multiplying every corner by the scale ratio.
    pub fn new(scale: WorkingScale, preview: Option<Quadrilateral>) -> Self {
        let quadrilateral = preview.map(|q| q.scaled(scale.ratio, CoordinateSpace::Original));
        Self {
            scale,
            preview,
            quadrilateral,
            processed: None,
        }
    }

    pub fn with_processed(mut self, image: RgbaImage) -> Self {
        self.processed = Some(image);
        self
    }

    pub fn found(&self) -> bool {
        self.quadrilateral.is_some()
    }

    pub fn scale(&self) -> &WorkingScale {
        &self.scale
    }

    pub fn original_size(&self) -> ImageSize {
        self.scale.original
    }

    /// Preview width (working space).
    pub fn width_with_ratio(&self) -> u32 {
        self.scale.working.width
    }

    /// Preview height (working space).
    pub fn height_with_ratio(&self) -> u32 {
        self.scale.working.height
    }

    /// Outline in working space, as drawn on the preview.
    pub fn preview(&self) -> Option<&Quadrilateral> {
        self.preview.as_ref()
    }

    /// Outline in original-image coordinates.
    pub fn quadrilateral(&self) -> Option<&Quadrilateral> {
        self.quadrilateral.as_ref()
    }

    pub fn processed(&self) -> Option<&RgbaImage> {
        self.processed.as_ref()
    }

    pub fn into_processed(self) -> Option<RgbaImage> {
        self.processed
    }

    pub fn to_report(&self) -> DetectionReport {
        DetectionReport::new(
            &self.scale,
            self.quadrilateral.as_ref().map(Quadrilateral::to_corner_points),
        )
    }
}
