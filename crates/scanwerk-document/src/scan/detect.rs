// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document detection: pick the document outline among traced contours and
// optionally rectify it.
//
// ## Pipeline
//
// 1. Extract contours in working space (largest area first)
// 2. Approximate each contour with a closed polygon; by default only
//    four-vertex polygons go on
// 3. Reduce the polygon to four canonical corners
// 4. Validate; the first accepted candidate wins unless best-score
//    selection is configured

use image::DynamicImage;
use scanwerk_core::config::{CandidateSelection, ScanConfig};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{CoordinateSpace, Quadrilateral, WorkingScale};
use tracing::{debug, info, instrument, trace, warn};

use super::contours::{ContourExtractor, ContourSet, EdgeContourExtractor};
use super::corners::sort_corners;
use super::document::ScannedDocument;
use super::polygon::approximate_polygon;
use super::rectify::PerspectiveRectifier;
use super::validate::QuadrilateralValidator;

/// Outcome of running the extractor and the candidate search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub scale: WorkingScale,
    /// Accepted outline in working space, if any.
    pub quadrilateral: Option<Quadrilateral>,
}

/// Finds a single document quadrilateral in a photo.
///
/// Holds no per-image state: every call extracts, searches and returns a
/// fresh result, so one detector can serve any number of images.
#[derive(Debug, Clone)]
pub struct DocumentDetector<E = EdgeContourExtractor> {
    extractor: E,
    validator: QuadrilateralValidator,
    rectifier: PerspectiveRectifier,
    approx_epsilon_ratio: f64,
    require_four_vertices: bool,
    selection: CandidateSelection,
}

impl Default for DocumentDetector {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl DocumentDetector {
    /// Detector backed by the default edge-based extractor.
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_extractor(EdgeContourExtractor::new(config), config)
    }
}

impl<E: ContourExtractor> DocumentDetector<E> {
    /// Detector backed by a custom contour source.
    pub fn with_extractor(extractor: E, config: &ScanConfig) -> Self {
        Self {
            extractor,
            validator: QuadrilateralValidator::from_config(config),
            rectifier: PerspectiveRectifier::from_config(config),
            approx_epsilon_ratio: config.approx_epsilon_ratio,
            require_four_vertices: config.require_four_vertices,
            selection: config.selection,
        }
    }

    pub fn rectifier(&self) -> &PerspectiveRectifier {
        &self.rectifier
    }

    // -- Candidate search -----------------------------------------------------

    /// Search already-extracted contours for a document outline.
    ///
    /// Contours are visited in the order given. Returns a working-space
    /// quadrilateral tagged with the index of the contour it came from.
    pub fn find_quadrilateral(&self, set: &ContourSet) -> Option<Quadrilateral> {
        let working = set.scale.working;
        let mut best: Option<(f64, Quadrilateral)> = None;

        for (index, contour) in set.contours.iter().enumerate() {
            let epsilon = self.approx_epsilon_ratio * contour.perimeter();
            let polygon = approximate_polygon(contour, epsilon);
            if self.require_four_vertices && polygon.len() != 4 {
                trace!(index, vertices = polygon.len(), "Not a quadrilateral");
                continue;
            }
            let Some(corners) = sort_corners(&polygon) else {
                continue;
            };

            let candidate =
                Quadrilateral::new(corners, CoordinateSpace::Working).with_contour_index(index);
            let assessment = self.validator.assess(&candidate, working);
            trace!(
                index,
                vertices = polygon.len(),
                accepted = assessment.accepted(),
                max_offset = assessment.max_offset,
                "Candidate assessed"
            );

            if !assessment.accepted() {
                continue;
            }

            match self.selection {
                CandidateSelection::FirstAccepted => return Some(candidate),
                CandidateSelection::BestScore => {
                    let score = assessment.score();
                    if best.is_none_or(|(top, _)| score > top) {
                        best = Some((score, candidate));
                    }
                }
            }
        }

        best.map(|(_, quad)| quad)
    }

    /// Extract contours from `image` and search them.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate(&self, image: &DynamicImage) -> Result<Detection> {
        let set = self.extractor.extract(image)?;
        let quadrilateral = self.find_quadrilateral(&set);

        match &quadrilateral {
            Some(quad) => info!(
                contour = quad.contour_index(),
                candidates = set.contours.len(),
                "Document outline found"
            ),
            None => info!(candidates = set.contours.len(), "No document outline found"),
        }

        Ok(Detection {
            scale: set.scale,
            quadrilateral,
        })
    }

    /// Working-space document outline, or `None` when nothing validates.
    pub fn detect(&self, image: &DynamicImage) -> Result<Option<Quadrilateral>> {
        Ok(self.locate(image)?.quadrilateral)
    }

    // -- Full scan ------------------------------------------------------------

    /// Detect and rectify in one call.
    ///
    /// Without an outline the processed image is an unmodified RGBA copy of
    /// the source. A degenerate outline is logged and treated the same way.
    pub fn scan(&self, image: &DynamicImage) -> Result<ScannedDocument> {
        let detection = self.locate(image)?;
        let document = ScannedDocument::new(detection.scale, detection.quadrilateral);
        let source = image.to_rgba8();

        let processed = match document.quadrilateral() {
            Some(quad) => match self.rectifier.rectify(&source, quad) {
                Ok(rectified) => rectified,
                Err(ScanwerkError::Geometry(detail)) => {
                    warn!(%detail, "Rectification failed, keeping the full frame");
                    source
                }
                Err(err) => return Err(err),
            },
            None => {
                debug!("Keeping the full frame");
                source
            }
        };

        Ok(document.with_processed(processed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};
    use scanwerk_core::types::{Contour, ImageSize, Point2D};

    /// Returns a fixed contour list for a 250x500 original (ratio 1).
    struct FixedContours(Vec<Contour>);

    impl ContourExtractor for FixedContours {
        fn extract(&self, _image: &DynamicImage) -> Result<ContourSet> {
            let scale = WorkingScale::for_image(ImageSize::new(250, 500), 500.0)
                .ok_or_else(|| ScanwerkError::Input("empty".into()))?;
            Ok(ContourSet {
                scale,
                contours: self.0.clone(),
            })
        }
    }

    struct FailingExtractor;

    impl ContourExtractor for FailingExtractor {
        fn extract(&self, _image: &DynamicImage) -> Result<ContourSet> {
            Err(ScanwerkError::Extraction("tracer gave up".into()))
        }
    }

    fn contour(points: &[(f64, f64)]) -> Contour {
        Contour::new(points.iter().map(|&(x, y)| Point2D::new(x, y)).collect())
    }

    fn skewed() -> Contour {
        contour(&[(90.0, 20.0), (230.0, 22.0), (232.0, 470.0), (30.0, 468.0)])
    }

    fn leaning() -> Contour {
        contour(&[(25.0, 25.0), (225.0, 35.0), (226.0, 475.0), (24.0, 474.0)])
    }

    fn upright() -> Contour {
        contour(&[(30.0, 30.0), (180.0, 30.0), (180.0, 330.0), (30.0, 330.0)])
    }

    fn stub_detector(
        contours: Vec<Contour>,
        selection: CandidateSelection,
    ) -> DocumentDetector<FixedContours> {
        let config = ScanConfig {
            selection,
            ..ScanConfig::default()
        };
        DocumentDetector::with_extractor(FixedContours(contours), &config)
    }

    fn ungated_detector(contours: Vec<Contour>) -> DocumentDetector<FixedContours> {
        let config = ScanConfig {
            require_four_vertices: false,
            ..ScanConfig::default()
        };
        DocumentDetector::with_extractor(FixedContours(contours), &config)
    }

    /// Grey noise from a fixed-seed linear congruential generator.
    fn grey_noise(width: u32, height: u32, seed: u64) -> DynamicImage {
        let mut state = seed;
        let img = image::GrayImage::from_fn(width, height, |_, _| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            Luma([(state >> 56) as u8])
        });
        DynamicImage::ImageLuma8(img)
    }

    fn blank() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(1, 1))
    }

    fn document_photo() -> DynamicImage {
        let img = RgbaImage::from_fn(1000, 2000, |x, y| {
            if (100..900).contains(&x) && (100..1900).contains(&y) {
                Rgba([240, 240, 240, 255])
            } else {
                Rgba([30, 30, 30, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    fn assert_near(actual: Point2D, expected: (f64, f64), tolerance: f64) {
        assert!(
            (actual.x - expected.0).abs() <= tolerance && (actual.y - expected.1).abs() <= tolerance,
            "{actual:?} not within {tolerance} of {expected:?}"
        );
    }

    #[test]
    fn first_accepted_candidate_wins() {
        let detector = stub_detector(
            vec![skewed(), leaning(), upright()],
            CandidateSelection::FirstAccepted,
        );
        let quad = detector.detect(&blank()).unwrap().unwrap();

        assert_eq!(quad.contour_index(), Some(1));
        assert_eq!(quad.space(), CoordinateSpace::Working);
        assert_eq!(quad.top_right(), Point2D::new(225.0, 35.0));
    }

    #[test]
    fn best_score_prefers_the_squarest_outline() {
        let detector = stub_detector(
            vec![skewed(), leaning(), upright()],
            CandidateSelection::BestScore,
        );
        let quad = detector.detect(&blank()).unwrap().unwrap();

        assert_eq!(quad.contour_index(), Some(2));
        assert_eq!(quad.top_left(), Point2D::new(30.0, 30.0));
        assert_eq!(quad.bottom_right(), Point2D::new(180.0, 330.0));
    }

    #[test]
    fn best_score_ties_keep_the_earlier_candidate() {
        let detector = stub_detector(vec![upright(), upright()], CandidateSelection::BestScore);
        let quad = detector.detect(&blank()).unwrap().unwrap();
        assert_eq!(quad.contour_index(), Some(0));
    }

    #[test]
    fn nothing_found_without_acceptable_contours() {
        let small = |x: f64| contour(&[(x, 10.0), (x + 9.0, 11.0), (x + 10.0, 20.0), (x - 1.0, 19.0)]);
        let detector = stub_detector(
            vec![skewed(), small(10.0), small(40.0), small(70.0)],
            CandidateSelection::FirstAccepted,
        );
        assert!(detector.detect(&blank()).unwrap().is_none());

        let detector = stub_detector(Vec::new(), CandidateSelection::BestScore);
        assert!(detector.detect(&blank()).unwrap().is_none());
    }

    #[test]
    fn triangle_collapses_two_corners_and_is_rejected() {
        let triangle = || contour(&[(125.0, 20.0), (230.0, 470.0), (20.0, 470.0)]);

        let detector = stub_detector(vec![triangle()], CandidateSelection::FirstAccepted);
        assert!(detector.detect(&blank()).unwrap().is_none());

        // Without the vertex gate the sorter puts the apex in two roles.
        assert!(ungated_detector(vec![triangle()]).detect(&blank()).unwrap().is_none());
    }

    #[test]
    fn pentagon_needs_the_vertex_gate_off() {
        // Rectangle with a 40 px peak on the top edge, too tall to simplify away.
        let pentagon = || {
            contour(&[
                (20.0, 20.0),
                (125.0, -20.0),
                (230.0, 20.0),
                (230.0, 480.0),
                (20.0, 480.0),
            ])
        };

        let detector = stub_detector(vec![pentagon()], CandidateSelection::FirstAccepted);
        assert!(detector.detect(&blank()).unwrap().is_none());

        let quad = ungated_detector(vec![pentagon()])
            .detect(&blank())
            .unwrap()
            .unwrap();
        assert_eq!(
            *quad.points(),
            [
                Point2D::new(20.0, 20.0),
                Point2D::new(230.0, 20.0),
                Point2D::new(230.0, 480.0),
                Point2D::new(20.0, 480.0),
            ]
        );
    }

    #[test]
    fn hexagon_reduces_to_its_extremal_corners() {
        let detector = stub_detector(
            vec![contour(&[
                (20.0, 20.0),
                (125.0, 14.0),
                (230.0, 20.0),
                (230.0, 480.0),
                (125.0, 486.0),
                (20.0, 480.0),
            ])],
            CandidateSelection::FirstAccepted,
        );
        let quad = detector.detect(&blank()).unwrap().unwrap();
        assert_eq!(
            *quad.points(),
            [
                Point2D::new(20.0, 20.0),
                Point2D::new(230.0, 20.0),
                Point2D::new(230.0, 480.0),
                Point2D::new(20.0, 480.0),
            ]
        );
    }

    #[test]
    fn extractor_errors_propagate() {
        let detector = DocumentDetector::with_extractor(FailingExtractor, &ScanConfig::default());
        let err = detector.detect(&blank()).unwrap_err();
        assert!(matches!(err, ScanwerkError::Extraction(_)));
        assert!(detector.scan(&blank()).is_err());
    }

    #[test]
    fn finds_document_on_dark_background() {
        let detector = DocumentDetector::default();
        let image = document_photo();

        let detection = detector.locate(&image).unwrap();
        assert_eq!(detection.scale.ratio, 4.0);
        assert_eq!(detection.scale.working, ImageSize::new(250, 500));

        let quad = detection.quadrilateral.expect("document outline");
        let tolerance = 4.0;
        assert_near(quad.top_left(), (25.0, 25.0), tolerance);
        assert_near(quad.top_right(), (225.0, 25.0), tolerance);
        assert_near(quad.bottom_right(), (225.0, 475.0), tolerance);
        assert_near(quad.bottom_left(), (25.0, 475.0), tolerance);

        let report = detector.scan(&image).unwrap().to_report();
        let corners = report.corners.expect("report corners");
        let tolerance = tolerance * 4.0;
        assert_near(corners.top_left, (100.0, 100.0), tolerance);
        assert_near(corners.top_right, (900.0, 100.0), tolerance);
        assert_near(corners.bottom_right, (900.0, 1900.0), tolerance);
        assert_near(corners.bottom_left, (100.0, 1900.0), tolerance);
    }

    #[test]
    fn detection_is_deterministic() {
        let detector = DocumentDetector::default();
        let image = document_photo();
        let first = detector.detect(&image).unwrap();
        for _ in 0..3 {
            assert_eq!(detector.detect(&image).unwrap(), first);
        }
    }

    #[test]
    fn scan_rectifies_the_detected_page() {
        let detector = DocumentDetector::default();
        let doc = detector.scan(&document_photo()).unwrap();

        assert!(doc.found());
        let processed = doc.processed().expect("processed image");
        let (w, h) = processed.dimensions();
        assert!(w.abs_diff(800) <= 24, "width {w}");
        assert!(h.abs_diff(1800) <= 24, "height {h}");
        assert_eq!(processed.get_pixel(w / 2, h / 2), &Rgba([240, 240, 240, 255]));
    }

    #[test]
    fn featureless_images_are_not_documents() {
        let detector = DocumentDetector::default();

        let flat = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 500, Rgba([90, 90, 90, 255])));
        assert!(detector.detect(&flat).unwrap().is_none());

        let gradient = DynamicImage::ImageLuma8(image::GrayImage::from_fn(400, 500, |x, _| {
            Luma([(x * 255 / 399) as u8])
        }));
        assert!(detector.detect(&gradient).unwrap().is_none());
    }

    #[test]
    fn uniform_noise_is_not_a_document() {
        let detector = DocumentDetector::default();
        assert!(detector.detect(&grey_noise(1000, 2000, 42)).unwrap().is_none());
        assert!(detector.detect(&grey_noise(1000, 1000, 7)).unwrap().is_none());
    }

    #[test]
    fn scan_without_document_keeps_the_full_frame() {
        let detector = DocumentDetector::default();
        let source = RgbaImage::from_pixel(60, 80, Rgba([12, 34, 56, 255]));
        let doc = detector
            .scan(&DynamicImage::ImageRgba8(source.clone()))
            .unwrap();

        assert!(!doc.found());
        assert_eq!(doc.processed(), Some(&source));
    }
}
