// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reports printed by the CLI — plain text for people, JSON for scripts.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use omr_core::{AnswerVector, QuestionOutcome, Score};
use omr_scan::SheetReading;
use omr_scan::sheet::BlockReading;
use serde::Serialize;

use crate::services::grading::GradingOutcome;

/// Result of grading one submission.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub graded_at: DateTime<Utc>,
    /// Key image path, or `"typed"` for a key given as text.
    pub key_source: String,
    pub submission_source: String,
    pub key: AnswerVector,
    pub answers: AnswerVector,
    pub score: Score,
    /// Grade rounded to one decimal.
    pub grade: f64,
    /// Wrong, blank, and multi-marked questions together.
    pub incorrect: usize,
    pub correct: Vec<usize>,
    pub wrong: Vec<usize>,
    pub unanswered: Vec<usize>,
    pub multi_marked: Vec<usize>,
    pub annulled: Vec<usize>,
}

impl SessionReport {
    pub fn new(key_source: String, submission_source: String, outcome: &GradingOutcome) -> Self {
        let report = &outcome.report;
        Self {
            graded_at: Utc::now(),
            key_source,
            submission_source,
            key: outcome.key.clone(),
            answers: outcome.submission.answers(),
            score: report.score,
            grade: report.rounded_grade(),
            incorrect: report.incorrect_count(),
            correct: report.questions_with(QuestionOutcome::Correct),
            wrong: report.questions_with(QuestionOutcome::Wrong),
            unanswered: report.questions_with(QuestionOutcome::Unanswered),
            multi_marked: report.questions_with(QuestionOutcome::MultiMarked),
            annulled: report.questions_with(QuestionOutcome::Annulled),
        }
    }

    /// Human-readable report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--------------------");
        let _ = writeln!(out, "         OMR");
        let _ = writeln!(out, "--------------------");
        let _ = writeln!(out, "Key:        {}", self.key);
        let _ = writeln!(out, "Answers:    {}", self.answers);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Grade: {:.1}  ({} of {} correct)",
            self.grade, self.score.correct_count, self.score.total_count
        );
        let _ = writeln!(out, "Incorrect: {}", self.incorrect);
        write_list(&mut out, "Wrong", &self.wrong);
        write_list(&mut out, "Left blank", &self.unanswered);
        write_list(&mut out, "Multiple marks", &self.multi_marked);
        write_list(&mut out, "Annulled", &self.annulled);
        out
    }
}

fn write_list(out: &mut String, label: &str, questions: &[usize]) {
    if questions.is_empty() {
        return;
    }
    let numbers: Vec<String> = questions.iter().map(usize::to_string).collect();
    let _ = writeln!(out, "{label}: {}", numbers.join(", "));
}

/// Result of decoding a single sheet.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    pub image: String,
    pub answers: AnswerVector,
    /// Block corners and mark counts, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<BlockReading>>,
}

impl DecodeReport {
    pub fn new(image: String, reading: SheetReading, with_counts: bool) -> Self {
        Self {
            image,
            answers: reading.answers(),
            blocks: with_counts.then_some(reading.blocks),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.image, self.answers);
        let Some(blocks) = &self.blocks else {
            return out;
        };
        let mut question = 1;
        for (index, block) in blocks.iter().enumerate() {
            let _ = writeln!(out, "\nBlock {} corners {:?}", index + 1, block.corners);
            for (counts, answer) in block.counts.iter().zip(&block.answers) {
                let cells: Vec<String> = counts.iter().map(|c| format!("{c:>5}")).collect();
                let _ = writeln!(out, "{question:>3} {} -> {answer}", cells.join(""));
                question += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omr_core::{AnswerCode, GradeReport, Grader};

    fn reading(answers: &str) -> SheetReading {
        let answers: AnswerVector = answers.parse().expect("valid answers");
        SheetReading {
            blocks: vec![BlockReading {
                corners: [(40, 100), (380, 100), (40, 1100), (380, 1100)],
                counts: answers.iter().map(|_| vec![900, 30, 30, 30, 30]).collect(),
                answers: answers.into_inner(),
            }],
        }
    }

    fn outcome(key: &str, submission: &str) -> GradingOutcome {
        let key: AnswerVector = key.parse().expect("valid key");
        let submission = reading(submission);
        let report: GradeReport = Grader::default()
            .grade(&key, &submission.answers())
            .expect("same length");
        GradingOutcome {
            key,
            submission,
            report,
        }
    }

    #[test]
    fn session_report_lists_outcomes() {
        let report = SessionReport::new("typed".into(), "s.jpg".into(), &outcome("AAAA-", "AB-*A"));
        assert_eq!(report.correct, vec![1]);
        assert_eq!(report.wrong, vec![2]);
        assert_eq!(report.unanswered, vec![3]);
        assert_eq!(report.multi_marked, vec![4]);
        assert_eq!(report.annulled, vec![5]);
        assert_eq!(report.grade, 2.5);
        assert_eq!(report.incorrect, 3);

        let text = report.to_text();
        assert!(text.contains("Grade: 2.5  (1 of 4 correct)"), "{text}");
        assert!(text.contains("Left blank: 3"));
        assert!(text.contains("Incorrect: 3"));
    }

    #[test]
    fn session_report_serializes_codes_as_letters() {
        let report = SessionReport::new("k.jpg".into(), "s.jpg".into(), &outcome("AB", "AB"));
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["key"], serde_json::json!(["A", "B"]));
        assert_eq!(json["score"]["correct_count"], 2);
    }

    #[test]
    fn decode_report_hides_counts_unless_requested() {
        let plain = DecodeReport::new("s.jpg".into(), reading("AB"), false);
        let json = serde_json::to_value(&plain).expect("serialize");
        assert!(json.get("blocks").is_none());
        assert_eq!(plain.to_text(), "s.jpg: A B\n");

        let detailed = DecodeReport::new("s.jpg".into(), reading("AB"), true);
        let text = detailed.to_text();
        assert!(text.contains("Block 1 corners"));
        assert!(text.contains("  1   900   30   30   30   30 -> A"), "{text}");
        assert_eq!(detailed.answers.get(1), Some(AnswerCode::B));
    }
}
