// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the scanning screen.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the host presents it (toast, retry button, dialog).

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something flaky happened; trying again may work.
    Transient,
    /// The user has to do something (pick another photo, move a corner).
    ActionRequired,
    /// Retrying or adjusting will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the host may retry the same call automatically.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::Input(_) => HumanError {
            message: "We couldn't open that photo.".into(),
            suggestion: "Choose the photo again, or take a new one.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Geometry(_) => HumanError {
            message: "The selected corners don't outline a page.".into(),
            suggestion: "Drag the corner handles onto the four corners of the document, then crop again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::ImageError(_) => HumanError {
            message: "The scan couldn't be saved as an image.".into(),
            suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Extraction(_) => HumanError {
            message: "We couldn't look for the page edges in this photo.".into(),
            suggestion: "Place the corners by hand, or retake the photo against a darker background.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Config(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Reset the scanner settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The photo couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing it again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Allow access to photos in your device settings, then try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        ScanwerkError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
