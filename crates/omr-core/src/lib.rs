// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OMR — Core types, configuration, error definitions, and grading shared
// across all crates.

pub mod config;
pub mod error;
pub mod grade;
pub mod human_errors;
pub mod types;

pub use config::{
    BlockAssignment, BlockConfig, DecisionRule, GraderConfig, GradingPolicy, SheetLayout,
    VisionParams,
};
pub use error::{OmrError, Result};
pub use grade::{GradeReport, Grader, QuestionOutcome, Score, score};
pub use types::*;
