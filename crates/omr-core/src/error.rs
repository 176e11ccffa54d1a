// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the OMR grader.

use thiserror::Error;

/// Top-level error type for all OMR operations.
///
/// Every failure is a deterministic function of the input image or the
/// configuration, so none of these is worth retrying without changing the
/// input.
#[derive(Debug, Error)]
pub enum OmrError {
    // -- Decode errors --
    #[error("found {found} answer-block candidate(s), layout needs {required}")]
    InsufficientCandidates { found: usize, required: usize },

    #[error("answer block {block} has degenerate corners")]
    DegenerateQuad { block: usize },

    // -- Configuration errors --
    #[error(
        "block of {width}x{height} px cannot be split evenly into {rows} rows x {columns} columns"
    )]
    DimensionMismatch {
        width: u32,
        height: u32,
        rows: u32,
        columns: u32,
    },

    #[error("invalid sheet layout: {0}")]
    InvalidLayout(String),

    #[error("invalid vision parameters: {0}")]
    InvalidVision(String),

    // -- Grading errors --
    #[error("answer key has {key} answers but the submission has {submission}")]
    LengthMismatch { key: usize, submission: usize },

    // -- Input --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("invalid answer code {0:?}")]
    InvalidAnswerCode(char),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OmrError>;
