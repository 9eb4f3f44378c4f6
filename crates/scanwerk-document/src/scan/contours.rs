// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction: turn a photo into closed outlines in working space.
//
// The detector only depends on the `ContourExtractor` trait. The default
// `EdgeContourExtractor` runs grayscale → downscale → blur → Otsu
// to-zero threshold → Canny → border following on top of `imageproc`.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use imageproc::contours::find_contours;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{Contour, ImageSize, Point2D, WorkingScale};
use tracing::{debug, instrument};

/// Working images wider than this many times their height are refused.
const MAX_WORKING_ASPECT: u32 = 20;

/// Contours traced from one image, largest enclosed area first.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    /// Original and working sizes plus the ratio between them.
    pub scale: WorkingScale,
    /// Closed outlines in working space, sorted by area (descending).
    pub contours: Vec<Contour>,
}

/// Source of document outline candidates.
///
/// Implementations must return contours in working space (height
/// `ScanConfig::working_height`, proportional width) sorted by enclosed area,
/// largest first.
pub trait ContourExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<ContourSet>;
}

/// Edge-based contour extractor built on `imageproc`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeContourExtractor {
    working_height: f64,
    blur_sigma: f32,
    canny_low: f32,
    canny_high: f32,
}

impl Default for EdgeContourExtractor {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl EdgeContourExtractor {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            working_height: config.working_height,
            blur_sigma: config.blur_sigma,
            canny_low: config.canny_low,
            canny_high: config.canny_high,
        }
    }

    /// Produce the binary-ish edge map contours are traced from.
    pub fn edge_map(&self, image: &DynamicImage, working: ImageSize) -> GrayImage {
        let gray = image.to_luma8();
        let resized = imageops::resize(&gray, working.width, working.height, FilterType::Triangle);
        let blurred = gaussian_blur_f32(&resized, self.blur_sigma);

        let level = otsu_level(&blurred);
        let binary = threshold(&blurred, level, ThresholdType::ToZero);
        debug!(level, "Otsu threshold applied");

        canny(&binary, self.canny_low, self.canny_high)
    }
}

impl ContourExtractor for EdgeContourExtractor {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn extract(&self, image: &DynamicImage) -> Result<ContourSet> {
        let original = ImageSize::new(image.width(), image.height());
        let scale = WorkingScale::for_image(original, self.working_height).ok_or_else(|| {
            ScanwerkError::Input(format!("cannot analyse a {original} image"))
        })?;

        let working = scale.working;
        if working.width < 3 || working.height < 3 {
            debug!(working = %working, "Working image too small to hold an outline");
            return Ok(ContourSet {
                scale,
                contours: Vec::new(),
            });
        }
        if working.width > working.height.saturating_mul(MAX_WORKING_ASPECT) {
            return Err(ScanwerkError::Extraction(format!(
                "working image {working} has an extreme aspect ratio"
            )));
        }

        let edges = self.edge_map(image, working);
        let contours = sort_by_area_descending(trace_contours(&edges));

        debug!(
            ratio = scale.ratio,
            working = %working,
            contours = contours.len(),
            "Contours extracted"
        );
        Ok(ContourSet { scale, contours })
    }
}

/// Border following via `imageproc::contours::find_contours`.
///
/// Outer borders and hole borders are both returned; the hierarchy is
/// dropped. Outlines with fewer than 3 points cannot enclose anything and
/// are skipped.
fn trace_contours(edges: &GrayImage) -> Vec<Contour> {
    find_contours::<u32>(edges)
        .into_iter()
        .filter(|c| c.points.len() >= 3)
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point2D::new(f64::from(p.x), f64::from(p.y)))
                .collect();
            Contour::new(points)
        })
        .collect()
}

/// Stable sort by enclosed area, largest first.
pub fn sort_by_area_descending(contours: Vec<Contour>) -> Vec<Contour> {
    let mut keyed: Vec<(f64, Contour)> = contours.into_iter().map(|c| (c.area(), c)).collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn document_photo(width: u32, height: u32, doc: (u32, u32, u32, u32)) -> DynamicImage {
        let (x0, y0, x1, y1) = doc;
        let img = RgbaImage::from_fn(width, height, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Rgba([240, 240, 235, 255])
            } else {
                Rgba([30, 32, 35, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn edge_map_marks_the_page_border_only() {
        let img = document_photo(500, 1000, (50, 50, 450, 950));
        let edges = EdgeContourExtractor::default().edge_map(&img, ImageSize::new(250, 500));

        assert_eq!(edges.dimensions(), (250, 500));
        // Interior of the page and the background far from it stay dark.
        assert_eq!(edges.get_pixel(125, 250).0[0], 0);
        assert_eq!(edges.get_pixel(5, 5).0[0], 0);
        assert!(edges.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let square = |x: f64, side: f64| {
            Contour::new(vec![
                Point2D::new(x, 0.0),
                Point2D::new(x + side, 0.0),
                Point2D::new(x + side, side),
                Point2D::new(x, side),
            ])
        };
        let sorted = sort_by_area_descending(vec![
            square(0.0, 2.0),
            square(10.0, 5.0),
            square(20.0, 2.0),
            square(30.0, 9.0),
        ]);
        let xs: Vec<f64> = sorted.iter().map(|c| c.points()[0].x).collect();
        assert_eq!(xs, vec![30.0, 10.0, 0.0, 20.0]);
    }

    #[test]
    fn blank_image_has_no_contours() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 400, Rgba([128, 128, 128, 255])));
        let set = EdgeContourExtractor::default().extract(&img).unwrap();
        assert!(set.contours.is_empty());
        assert_eq!(set.scale.working.height, 500);
    }

    #[test]
    fn rectangle_yields_largest_contour_around_it() {
        let img = document_photo(500, 1000, (50, 50, 450, 950));
        let set = EdgeContourExtractor::default().extract(&img).unwrap();

        assert_eq!(set.scale.working, ImageSize::new(250, 500));
        assert!(!set.contours.is_empty());

        // Document spans (25,25)-(225,475) in working space.
        let largest = &set.contours[0];
        let xs = largest.points().iter().map(|p| p.x);
        let ys = largest.points().iter().map(|p| p.y);
        let (min_x, max_x) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let (min_y, max_y) = ys.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        assert!((min_x - 25.0).abs() <= 3.0, "min_x {min_x}");
        assert!((max_x - 225.0).abs() <= 3.0, "max_x {max_x}");
        assert!((min_y - 25.0).abs() <= 3.0, "min_y {min_y}");
        assert!((max_y - 475.0).abs() <= 3.0, "max_y {max_y}");

        let areas: Vec<f64> = set.contours.iter().map(Contour::area).collect();
        assert!(areas.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn empty_image_is_input_error() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        let err = EdgeContourExtractor::default().extract(&img).unwrap_err();
        assert!(matches!(err, ScanwerkError::Input(_)));
    }

    #[test]
    fn sliver_image_has_no_contours() {
        // 4x1000 shrinks to a 2x500 working image.
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 1000));
        let set = EdgeContourExtractor::default().extract(&img).unwrap();
        assert!(set.contours.is_empty());
        assert_eq!(set.scale.working, ImageSize::new(2, 500));
    }

    #[test]
    fn extreme_panorama_is_refused() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4000, 10));
        let err = EdgeContourExtractor::default().extract(&img).unwrap_err();
        assert!(matches!(err, ScanwerkError::Extraction(_)));
    }
}
