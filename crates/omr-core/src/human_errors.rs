// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people grading sheets at a desk.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity says who has to act: the person holding the camera, the
// person who wrote the configuration, or the caller of the grader.

use crate::error::OmrError;

/// Who needs to do something about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The photograph cannot be read; take it again or pick another file.
    RetakePhoto,
    /// The sheet layout or config file is wrong; nothing per-sheet helps.
    FixConfiguration,
    /// The grader was called with inconsistent inputs.
    Usage,
    /// A file could not be read or written.
    FileAccess,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert an `OmrError` into a `HumanError`.
pub fn humanize_error(err: &OmrError) -> HumanError {
    match err {
        // -- Decode errors --
        OmrError::InsufficientCandidates { found, required } => HumanError {
            message: format!(
                "Only {found} of the {required} answer boxes could be found on this sheet."
            ),
            suggestion: "Photograph the whole sheet flat, in even light, with every answer box fully in the frame.".into(),
            severity: Severity::RetakePhoto,
        },

        OmrError::DegenerateQuad { block } => HumanError {
            message: format!("Answer box {} is too distorted to read.", block + 1),
            suggestion: "Hold the camera directly above the sheet and take the photograph again.".into(),
            severity: Severity::RetakePhoto,
        },

        OmrError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::RetakePhoto,
        },

        // -- Configuration --
        OmrError::DimensionMismatch { rows, columns, .. } => HumanError {
            message: "The sheet layout doesn't divide into equal answer bubbles.".into(),
            suggestion: format!(
                "Choose a block size that is a multiple of {rows} rows and {columns} columns in the configuration file."
            ),
            severity: Severity::FixConfiguration,
        },

        OmrError::InvalidLayout(detail) => HumanError {
            message: "The sheet layout in the configuration is not usable.".into(),
            suggestion: format!("Fix the layout section of the configuration file. ({detail})"),
            severity: Severity::FixConfiguration,
        },

        OmrError::InvalidVision(detail) => HumanError {
            message: "The image settings in the configuration are not usable.".into(),
            suggestion: format!("Fix the vision section of the configuration file. ({detail})"),
            severity: Severity::FixConfiguration,
        },

        OmrError::Serialization(_) => HumanError {
            message: "The configuration file couldn't be read.".into(),
            suggestion: "Check that it is valid JSON, or run `omr config` to print a fresh default.".into(),
            severity: Severity::FixConfiguration,
        },

        // -- Usage --
        OmrError::LengthMismatch { key, submission } => HumanError {
            message: "The answer key and the student's sheet have different numbers of questions.".into(),
            suggestion: format!(
                "Make sure both come from the same kind of sheet. (Key: {key}, student: {submission})"
            ),
            severity: Severity::Usage,
        },

        OmrError::InvalidAnswerCode(symbol) => HumanError {
            message: format!("'{symbol}' is not an answer."),
            suggestion: "Type answers as A to E, '-' for blank, or '*' for multiple marks.".into(),
            severity: Severity::Usage,
        },

        // -- Files --
        OmrError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    severity: Severity::FileAccess,
                }
            } else if io_err.kind() == std::io::ErrorKind::Interrupted {
                HumanError {
                    message: "No image was chosen.".into(),
                    suggestion: "Run the command again and pick an image, or pass --key and --submission.".into(),
                    severity: Severity::Usage,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The grader doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or try copying the file to a different location first.".into(),
                    severity: Severity::FileAccess,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    severity: Severity::FileAccess,
                }
            }
        }
    }
}
