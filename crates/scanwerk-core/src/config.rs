// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration: detection heuristics, rectification fill and output
// encoding. Every field has a default so partial JSON files are accepted.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ScanwerkError};

/// How the detector chooses among geometrically valid candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSelection {
    /// Stop at the first accepted contour (largest area first).
    #[default]
    FirstAccepted,
    /// Examine every contour and keep the highest validator score.
    BestScore,
}

/// Tunable parameters for detection, rectification and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Height of the working space contours are analysed in.
    pub working_height: f64,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Gaussian blur sigma applied before thresholding.
    pub blur_sigma: f32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Skip contours whose approximated polygon does not have exactly four
    /// vertices. When off, any polygon is reduced to its extremal corners.
    pub require_four_vertices: bool,
    /// Minimum document edge is `working_width / min_size_divisor`.
    pub min_size_divisor: f64,
    /// Candidate selection policy.
    pub selection: CandidateSelection,
    /// JPEG quality (1-100) for cropped output.
    pub jpeg_quality: u8,
    /// RGBA value for rectified pixels that fall outside the source image.
    pub fill_rgba: [u8; 4],
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            working_height: 500.0,
            approx_epsilon_ratio: 0.02,
            blur_sigma: 1.1,
            canny_low: 80.0,
            canny_high: 100.0,
            require_four_vertices: true,
            min_size_divisor: 10.0,
            selection: CandidateSelection::FirstAccepted,
            jpeg_quality: 85,
            fill_rgba: [0, 0, 0, 0],
        }
    }
}

impl ScanConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(?config, "Scan configuration parsed");
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let problem = if !(self.working_height.is_finite() && self.working_height >= 1.0) {
            Some(format!("working_height must be >= 1, got {}", self.working_height))
        } else if !(self.approx_epsilon_ratio.is_finite() && self.approx_epsilon_ratio >= 0.0) {
            Some(format!(
                "approx_epsilon_ratio must be non-negative, got {}",
                self.approx_epsilon_ratio
            ))
        } else if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            Some(format!("blur_sigma must be positive, got {}", self.blur_sigma))
        } else if self.canny_low > self.canny_high {
            Some(format!(
                "canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            ))
        } else if !(self.min_size_divisor.is_finite() && self.min_size_divisor > 0.0) {
            Some(format!(
                "min_size_divisor must be positive, got {}",
                self.min_size_divisor
            ))
        } else if !(1..=100).contains(&self.jpeg_quality) {
            Some(format!("jpeg_quality must be 1-100, got {}", self.jpeg_quality))
        } else {
            None
        };

        match problem {
            Some(detail) => {
                warn!(%detail, "Rejected scan configuration");
                Err(ScanwerkError::Config(detail))
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.working_height, 500.0);
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.selection, CandidateSelection::FirstAccepted);
        assert!(config.require_four_vertices);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = ScanConfig::from_json_str(r#"{ "jpeg_quality": 70, "selection": "best_score" }"#)
            .unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert_eq!(config.selection, CandidateSelection::BestScore);
        assert_eq!(config.canny_low, 80.0);
    }

    #[test]
    fn inverted_canny_thresholds_are_rejected() {
        let err = ScanConfig::from_json_str(r#"{ "canny_low": 120.0, "canny_high": 100.0 }"#)
            .unwrap_err();
        assert!(matches!(err, ScanwerkError::Config(_)));
    }

    #[test]
    fn zero_quality_is_rejected() {
        let config = ScanConfig {
            jpeg_quality: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScanwerkError::Config(_))));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = ScanConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ScanwerkError::Serialization(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "working_height": 400.0 }}"#).unwrap();
        let config = ScanConfig::load(file.path()).unwrap();
        assert_eq!(config.working_height, 400.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ScanConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ScanwerkError::Io(_)));
    }
}
