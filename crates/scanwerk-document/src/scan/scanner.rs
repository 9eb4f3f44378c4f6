// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host entry points: detect a document in an image file, and crop an image
// file to caller-supplied corners.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{
    CoordinateSpace, CornerPoints, DetectionReport, ImageSize, Quadrilateral, WorkingScale,
};
use tracing::{debug, info, instrument, warn};

use super::detect::DocumentDetector;
use super::document::ScannedDocument;
use crate::image::ImageProcessor;

/// Which space the corners of a crop request are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateHint {
    /// Original-image pixels, as returned by `find_document`.
    #[default]
    Original,
    /// Working-space pixels; multiplied by the scale ratio.
    Working,
    /// Guess: corners whose top-right x, stretched by
    /// `original_width / working_height`, still fall inside the image are
    /// taken as working space.
    Infer,
}

/// Corners to crop to, in canonical roles. They are used as given and
/// never re-sorted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRequest {
    pub corners: CornerPoints,
    #[serde(default)]
    pub hint: CoordinateHint,
}

impl CropRequest {
    pub fn new(corners: CornerPoints, hint: CoordinateHint) -> Self {
        Self { corners, hint }
    }
}

/// Where a crop was written and how big it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropOutput {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Report and written image of a one-step scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutput {
    pub report: DetectionReport,
    pub output: CropOutput,
}

/// File-based detect and crop, as called by the host application.
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    detector: DocumentDetector,
    config: ScanConfig,
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self {
            detector: DocumentDetector::default(),
            config: ScanConfig::default(),
        }
    }
}

impl DocumentScanner {
    /// Validate `config` and build a scanner around it.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: DocumentDetector::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn detector(&self) -> &DocumentDetector {
        &self.detector
    }

    /// Detect the document outline in the image at `uri` (a path or a
    /// `file://` URI). Corners are reported in original-image pixels.
    #[instrument(skip(self))]
    pub fn find_document(&self, uri: &str) -> Result<DetectionReport> {
        let path = resolve_path(uri)?;
        let photo = ImageProcessor::open(&path)?;
        let detection = self.detector.locate(photo.as_dynamic())?;

        let report = ScannedDocument::new(detection.scale, detection.quadrilateral).to_report();
        info!(found = report.found, "Detection finished");
        Ok(report)
    }

    /// Rectify the image at `uri` to the requested corners and write it as
    /// `<out_dir>/<stem>-cropped.jpg`.
    #[instrument(skip(self, request, out_dir), fields(hint = ?request.hint))]
    pub fn crop(
        &self,
        uri: &str,
        request: &CropRequest,
        out_dir: impl AsRef<Path>,
    ) -> Result<CropOutput> {
        let path = resolve_path(uri)?;
        let photo = ImageProcessor::open(&path)?;
        let rectified = self.crop_image(photo.as_dynamic(), request)?;
        let (width, height) = rectified.dimensions();

        let output_path = output_file(&path, out_dir.as_ref(), "cropped");

        ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(rectified))
            .write_jpeg(&output_path, self.config.jpeg_quality)?;

        info!(path = %output_path.display(), width, height, "Cropped image written");
        Ok(CropOutput {
            path: output_path,
            width,
            height,
        })
    }

    /// Detect and rectify the image at `uri`, writing the result as
    /// `<out_dir>/<stem>-scanned.jpg`. Without a detected outline the whole
    /// frame is written.
    #[instrument(skip(self, out_dir))]
    pub fn scan(&self, uri: &str, out_dir: impl AsRef<Path>) -> Result<ScanOutput> {
        let path = resolve_path(uri)?;
        let photo = ImageProcessor::open(&path)?;
        let document = self.detector.scan(photo.as_dynamic())?;
        let report = document.to_report();

        let processed = document
            .into_processed()
            .ok_or_else(|| ScanwerkError::ImageError("scan produced no image".into()))?;
        let (width, height) = processed.dimensions();
        let output_path = output_file(&path, out_dir.as_ref(), "scanned");

        ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(processed))
            .write_jpeg(&output_path, self.config.jpeg_quality)?;

        info!(path = %output_path.display(), found = report.found, "Scan written");
        Ok(ScanOutput {
            report,
            output: CropOutput {
                path: output_path,
                width,
                height,
            },
        })
    }

    /// Rectify an in-memory image to the requested corners.
    pub fn crop_image(&self, image: &DynamicImage, request: &CropRequest) -> Result<RgbaImage> {
        let size = ImageSize::new(image.width(), image.height());
        let quad = self.resolve_corners(request, size)?;
        self.detector.rectifier().rectify(&image.to_rgba8(), &quad)
    }

    /// Turn the request's corners into an original-space quadrilateral for
    /// an image of `original` size.
    pub fn resolve_corners(&self, request: &CropRequest, original: ImageSize) -> Result<Quadrilateral> {
        let scale = WorkingScale::for_image(original, self.config.working_height)
            .ok_or_else(|| ScanwerkError::Input(format!("cannot crop a {original} image")))?;
        let quad = Quadrilateral::from_corner_points(&request.corners, CoordinateSpace::Original);

        let in_working_space = match request.hint {
            CoordinateHint::Original => false,
            CoordinateHint::Working => true,
            CoordinateHint::Infer => {
                let width = f64::from(original.width);
                let stretched =
                    request.corners.top_right.x * (width / self.config.working_height);
                debug!(stretched, width, "Inferring corner space");
                stretched < width
            }
        };

        if in_working_space {
            Ok(quad.scaled(scale.ratio, CoordinateSpace::Original))
        } else {
            Ok(quad)
        }
    }
}

/// `<out_dir>/<stem>-<suffix>.jpg` for the photo at `path`.
fn output_file(path: &Path, out_dir: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    out_dir.join(format!("{stem}-{suffix}.jpg"))
}

/// Turn a plain path or `file://` URI into a path. Surrounding whitespace
/// is ignored; an empty location is an `Input` error.
pub fn resolve_path(uri: &str) -> Result<PathBuf> {
    let trimmed = uri.trim();
    let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
    if path.is_empty() {
        warn!(uri, "Empty image location");
        return Err(ScanwerkError::Input("no image path given".into()));
    }
    Ok(PathBuf::from(path))
}
