// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grading — positional comparison of a submission against the answer key.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GradingPolicy;
use crate::error::{OmrError, Result};
use crate::types::{AnswerCode, AnswerVector};

/// Headline result of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub correct_count: usize,
    /// Questions that counted towards the grade.
    pub total_count: usize,
    /// `correct_count / total_count × full_scale`, or 0 when nothing counted.
    pub normalized_grade: f64,
}

/// How a single question was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    Correct,
    Wrong,
    /// The student left the question blank.
    Unanswered,
    /// The student marked more than one alternative.
    MultiMarked,
    /// The key itself is blank or ambiguous, so the question does not count.
    Annulled,
}

/// Full grading result with per-question outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub score: Score,
    pub outcomes: Vec<QuestionOutcome>,
}

impl GradeReport {
    /// 1-based numbers of the questions with the given outcome.
    pub fn questions_with(&self, outcome: QuestionOutcome) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| **o == outcome)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Wrong answers of any kind: a different alternative, blank, or
    /// multi-marked.
    pub fn incorrect_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    QuestionOutcome::Wrong
                        | QuestionOutcome::Unanswered
                        | QuestionOutcome::MultiMarked
                )
            })
            .count()
    }

    /// The grade rounded to one decimal place, for display.
    pub fn rounded_grade(&self) -> f64 {
        (self.score.normalized_grade * 10.0).round() / 10.0
    }
}

/// Compares submissions against a key under a fixed policy and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grader {
    policy: GradingPolicy,
    full_scale: f64,
}

impl Default for Grader {
    fn default() -> Self {
        Self::new(GradingPolicy::default(), 10.0)
    }
}

impl Grader {
    pub fn new(policy: GradingPolicy, full_scale: f64) -> Self {
        Self { policy, full_scale }
    }

    /// Grade `submission` against `key`.
    ///
    /// The vectors must have the same length; anything else is a usage
    /// error and nothing is truncated or padded.
    pub fn grade(&self, key: &AnswerVector, submission: &AnswerVector) -> Result<GradeReport> {
        if key.len() != submission.len() {
            return Err(OmrError::LengthMismatch {
                key: key.len(),
                submission: submission.len(),
            });
        }

        let outcomes: Vec<QuestionOutcome> = key
            .iter()
            .zip(submission.iter())
            .map(|(expected, given)| self.judge(*expected, *given))
            .collect();

        let correct_count = outcomes
            .iter()
            .filter(|o| **o == QuestionOutcome::Correct)
            .count();
        let total_count = outcomes
            .iter()
            .filter(|o| **o != QuestionOutcome::Annulled)
            .count();
        let normalized_grade = if total_count == 0 {
            0.0
        } else {
            correct_count as f64 / total_count as f64 * self.full_scale
        };

        debug!(
            correct_count,
            total_count,
            normalized_grade,
            policy = ?self.policy,
            "submission graded"
        );

        Ok(GradeReport {
            score: Score {
                correct_count,
                total_count,
                normalized_grade,
            },
            outcomes,
        })
    }

    fn judge(&self, expected: AnswerCode, given: AnswerCode) -> QuestionOutcome {
        if self.policy == GradingPolicy::ValidKeyOnly && !expected.is_alternative() {
            return QuestionOutcome::Annulled;
        }
        if expected == given {
            return QuestionOutcome::Correct;
        }
        match given {
            AnswerCode::Blank => QuestionOutcome::Unanswered,
            AnswerCode::Multi => QuestionOutcome::MultiMarked,
            _ => QuestionOutcome::Wrong,
        }
    }
}

/// Grade with the default policy (blank/ambiguous key questions annulled)
/// on a 0–10 scale.
pub fn score(key: &AnswerVector, submission: &AnswerVector) -> Result<Score> {
    Grader::default().grade(key, submission).map(|r| r.score)
}
