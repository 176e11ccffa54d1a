// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grading service — decodes the key and submission photographs on Tokio's
// blocking pool and grades the result.
//
// Decoding is CPU-bound, so each sheet runs under `spawn_blocking`. The two
// sheets share nothing but the immutable decoder, which is cloned into each
// task.

use std::path::{Path, PathBuf};

use omr_core::{AnswerVector, GradeReport, Grader, GraderConfig, OmrError, Result};
use omr_scan::{SheetDecoder, SheetReading};
use tracing::{info, instrument};

/// Where the answer key comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// A photograph of a filled-in key sheet.
    Image(PathBuf),
    /// Answers typed on the command line.
    Text(AnswerVector),
}

/// Decoded key and submission with their grade.
#[derive(Debug, Clone)]
pub struct GradingOutcome {
    pub key: AnswerVector,
    pub submission: SheetReading,
    pub report: GradeReport,
}

/// Decoder and grader built from one configuration.
#[derive(Debug, Clone)]
pub struct GradingService {
    decoder: SheetDecoder,
    grader: Grader,
}

impl GradingService {
    /// Fails if the configured layout cannot be decoded.
    pub fn new(config: &GraderConfig) -> Result<Self> {
        Ok(Self {
            decoder: SheetDecoder::new(config)?,
            grader: Grader::new(config.grading, config.full_scale),
        })
    }

    /// Decode one photograph off the async runtime.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn decode_image(&self, path: &Path) -> Result<SheetReading> {
        let decoder = self.decoder.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let image = omr_scan::ImageProcessor::open(&path)?;
            decoder.decode_detailed(image.into_dynamic())
        })
        .await
        .map_err(|err| OmrError::ImageError(format!("decoding stopped unexpectedly: {err}")))?
    }

    async fn resolve_key(&self, key: KeySource) -> Result<AnswerVector> {
        match key {
            KeySource::Text(answers) => Ok(answers),
            KeySource::Image(path) => Ok(self.decode_image(&path).await?.answers()),
        }
    }

    /// Decode the key and the submission concurrently, then grade.
    pub async fn grade(&self, key: KeySource, submission: &Path) -> Result<GradingOutcome> {
        let (key, submission) =
            tokio::try_join!(self.resolve_key(key), self.decode_image(submission))?;

        let report = self.grader.grade(&key, &submission.answers())?;
        info!(
            correct = report.score.correct_count,
            total = report.score.total_count,
            grade = report.score.normalized_grade,
            "submission graded"
        );
        Ok(GradingOutcome {
            key,
            submission,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omr_core::{AnswerCode, BlockConfig, SheetLayout};

    #[tokio::test]
    async fn missing_submission_file_is_io_error() {
        let service = GradingService::new(&GraderConfig::default()).expect("reference layout");
        let key = KeySource::Text(AnswerVector::filled(AnswerCode::A, 50));
        let err = service
            .grade(key, Path::new("/nonexistent/student.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, OmrError::Io(_)));
    }

    #[tokio::test]
    async fn unreadable_image_is_image_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("student.png");
        std::fs::write(&path, b"not really a png").expect("write");

        let service = GradingService::new(&GraderConfig::default()).expect("reference layout");
        let err = service.decode_image(&path).await.unwrap_err();
        assert!(matches!(err, OmrError::ImageError(_)));
    }

    #[test]
    fn invalid_layout_is_rejected_up_front() {
        let config = GraderConfig {
            layout: SheetLayout {
                blocks: vec![BlockConfig::new(25, 7)],
                ..SheetLayout::default()
            },
            ..GraderConfig::default()
        };
        assert!(GradingService::new(&config).is_err());
    }
}
