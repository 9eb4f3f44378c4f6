// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
///
/// Not finding a document is not an error: detection returns `Ok(None)` or a
/// report with `found: false`.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Caller input --
    #[error("invalid input: {0}")]
    Input(String),

    // -- Geometry --
    #[error("degenerate geometry: {0}")]
    Geometry(String),

    // -- Image pipeline --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("contour extraction failed: {0}")]
    Extraction(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
