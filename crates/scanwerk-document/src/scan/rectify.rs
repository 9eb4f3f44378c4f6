// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: map a document quadrilateral onto an upright
// rectangle.
//
// ## Pipeline
//
// 1. Output width/height from the longer of each pair of opposite edges
// 2. Projective transform from the four corners (`imageproc::Projection`)
// 3. Inverse-map every output pixel and sample the source bilinearly
//
// Sampling is done here rather than with `warp_into`, whose bilinear
// interpolation drops the last source row and column.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::Projection;
use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{CoordinateSpace, Quadrilateral};
use tracing::{debug, info, instrument, warn};

/// Largest width or height of a rectified image.
pub const MAX_OUTPUT_SIDE: u32 = 1 << 15;

/// Largest pixel count of a rectified image (1 GiB of RGBA).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Triangles spanned by three corners with less area than this are flat.
const COLLINEAR_EPSILON: f64 = 1e-6;

/// Projective transform taking the `width`×`height` output rectangle back
/// onto `quad`, i.e. output pixel → source pixel.
///
/// Returns `None` when three consecutive corners are collinear or the
/// control points admit no invertible transform.
pub fn inverse_projection(quad: &Quadrilateral, width: u32, height: u32) -> Option<Projection> {
    let points = quad.points();
    let flat = (0..4).any(|i| {
        let (a, b, c) = (points[i], points[(i + 1) % 4], points[(i + 2) % 4]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        !cross.is_finite() || cross.abs() < COLLINEAR_EPSILON
    });
    if flat {
        return None;
    }

    let (w, h) = (width as f32, height as f32);
    let src = points.map(|p| (p.x as f32, p.y as f32));
    let dest = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    Projection::from_control_points(src, dest).map(Projection::invert)
}

/// Rectified output size: the longer of each pair of opposite edges,
/// rounded to whole pixels.
pub fn output_dimensions(quad: &Quadrilateral) -> (u32, u32) {
    let [tl, tr, br, bl] = *quad.points();

    let width = br.distance(&bl).max(tr.distance(&tl));
    let height = tr.distance(&br).max(tl.distance(&bl));

    // `as` saturates: NaN and negatives become 0.
    (width.round() as u32, height.round() as u32)
}

/// Warps a document quadrilateral into an upright rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveRectifier {
    fill: Rgba<u8>,
}

impl Default for PerspectiveRectifier {
    fn default() -> Self {
        Self::new(Rgba([0, 0, 0, 0]))
    }
}

impl PerspectiveRectifier {
    /// `fill` is written wherever the inverse mapping lands outside the
    /// source image.
    pub fn new(fill: Rgba<u8>) -> Self {
        Self { fill }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(Rgba(config.fill_rgba))
    }

    /// Rectify the region of `source` bounded by `quad`.
    ///
    /// `quad` must be in original-image coordinates. Zero-sized outputs and
    /// singular transforms are `Geometry` errors.
    #[instrument(skip_all, fields(src_w = source.width(), src_h = source.height()))]
    pub fn rectify(&self, source: &RgbaImage, quad: &Quadrilateral) -> Result<RgbaImage> {
        if quad.space() != CoordinateSpace::Original {
            return Err(ScanwerkError::Geometry(
                "rectification needs original-image coordinates".into(),
            ));
        }
        if source.width() == 0 || source.height() == 0 {
            return Err(ScanwerkError::Input("source image is empty".into()));
        }

        let (out_w, out_h) = output_dimensions(quad);
        debug!(
            top_left = ?quad.top_left(),
            top_right = ?quad.top_right(),
            bottom_right = ?quad.bottom_right(),
            bottom_left = ?quad.bottom_left(),
            out_w,
            out_h,
            "Output dimensions computed"
        );

        if out_w == 0 || out_h == 0 {
            warn!(out_w, out_h, "Quadrilateral collapses to an empty image");
            return Err(ScanwerkError::Geometry(format!(
                "quadrilateral yields a {out_w}x{out_h} output"
            )));
        }
        if out_w > MAX_OUTPUT_SIDE
            || out_h > MAX_OUTPUT_SIDE
            || u64::from(out_w) * u64::from(out_h) > MAX_OUTPUT_PIXELS
        {
            warn!(out_w, out_h, "Quadrilateral yields an oversized image");
            return Err(ScanwerkError::Geometry(format!(
                "quadrilateral yields a {out_w}x{out_h} output, above the rectification limit"
            )));
        }

        let inverse = inverse_projection(quad, out_w, out_h).ok_or_else(|| {
            warn!("Quadrilateral corners admit no projective transform");
            ScanwerkError::Geometry("corners do not define a projective transform".into())
        })?;

        let mut output = RgbaImage::from_pixel(out_w, out_h, self.fill);
        for (x, y, pixel) in output.enumerate_pixels_mut() {
            let (sx, sy) = inverse * (x as f32, y as f32);
            if let Some(sample) = sample_bilinear(source, f64::from(sx), f64::from(sy)) {
                *pixel = sample;
            }
        }

        info!(out_w, out_h, "Perspective correction applied");
        Ok(output)
    }
}

/// Bilinear sample at `(x, y)`.
///
/// Coordinates inside the footprint of the edge pixels (half a pixel beyond
/// the outermost centres) are clamped to the border; anything further out
/// returns `None`.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Option<Rgba<u8>> {
    let (width, height) = image.dimensions();
    let (max_x, max_y) = (f64::from(width) - 1.0, f64::from(height) - 1.0);

    // Written so NaN fails the bounds test.
    if !(x >= -0.5 && x <= max_x + 0.5 && y >= -0.5 && y <= max_y + 0.5) {
        return None;
    }

    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let fx = x - f64::from(x0);
    let fy = y - f64::from(y0);

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut result = [0u8; 4];
    for c in 0..4 {
        let value = f64::from(p00[c]) * (1.0 - fx) * (1.0 - fy)
            + f64::from(p10[c]) * fx * (1.0 - fy)
            + f64::from(p01[c]) * (1.0 - fx) * fy
            + f64::from(p11[c]) * fx * fy;
        result[c] = value.round().clamp(0.0, 255.0) as u8;
    }

    Some(Rgba(result))
}
