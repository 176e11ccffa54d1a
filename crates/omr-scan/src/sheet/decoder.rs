// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet decoder — runs the full pipeline on one photograph:
// resize → edge map → locate blocks → assign → rectify → grid → answers.

use image::DynamicImage;
use omr_core::{
    AnswerVector, BlockAssignment, BlockConfig, DecisionRule, GraderConfig, OmrError, Result,
    SheetLayout, VisionParams,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::geometry::canonicalize_quad;
use super::grid::{BlockReading, read_block};
use super::locate::{BlockLocator, Quad};
use super::rectify::BlockRectifier;
use crate::image::ImageProcessor;

/// Everything read from one sheet, block by block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetReading {
    pub blocks: Vec<BlockReading>,
}

impl SheetReading {
    /// Answers of all blocks concatenated in layout order.
    pub fn answers(&self) -> AnswerVector {
        self.blocks
            .iter()
            .flat_map(|b| b.answers.iter().copied())
            .collect()
    }
}

/// Decodes photographs of one sheet model into answer vectors.
///
/// The decoder holds only configuration, so one instance can be cloned into
/// worker threads and used for any number of sheets.
#[derive(Debug, Clone)]
pub struct SheetDecoder {
    layout: SheetLayout,
    vision: VisionParams,
    locator: BlockLocator,
    rectifier: BlockRectifier,
    decision: DecisionRule,
}

impl SheetDecoder {
    /// Build a decoder for the sheet model described by `config`.
    pub fn new(config: &GraderConfig) -> Result<Self> {
        Self::from_parts(
            config.layout.clone(),
            config.vision.clone(),
            config.decision,
        )
    }

    /// Build a decoder from individual settings. Fails if the layout does
    /// not tile or the vision settings are unusable.
    pub fn from_parts(
        layout: SheetLayout,
        vision: VisionParams,
        decision: DecisionRule,
    ) -> Result<Self> {
        layout.validate()?;
        vision.validate()?;
        debug!(
            blocks = layout.blocks.len(),
            questions = layout.total_questions(),
            "sheet decoder ready"
        );
        Ok(Self {
            locator: BlockLocator::new(&vision),
            rectifier: BlockRectifier::new(
                layout.block_width,
                layout.block_height,
                vision.mark_threshold,
            ),
            layout,
            vision,
            decision,
        })
    }

    /// Decode a photograph into its answer vector.
    pub fn decode(&self, raw: DynamicImage) -> Result<AnswerVector> {
        self.decode_detailed(raw).map(|reading| reading.answers())
    }

    /// Decode a photograph, keeping block corners and per-cell mark counts.
    #[instrument(skip_all, fields(width = raw.width(), height = raw.height()))]
    pub fn decode_detailed(&self, raw: DynamicImage) -> Result<SheetReading> {
        let processor = ImageProcessor::from_dynamic(raw)
            .resize_exact(self.layout.working_width, self.layout.working_height);

        let edges = processor.edge_map(&self.vision);
        let candidates = self.locator.locate(&edges);
        let quads = assign_blocks(candidates, self.layout.blocks.len(), self.vision.assignment)?;

        let sheet = processor.to_rgb();
        let mut blocks = Vec::with_capacity(quads.len());
        for (index, (quad, config)) in quads.iter().zip(&self.layout.blocks).enumerate() {
            let rectified = self
                .rectifier
                .rectify(&quad.corners, &sheet)
                .zip(canonicalize_quad(&quad.corners));
            let Some((block, corners)) = rectified else {
                warn!(block = index, corners = ?quad.corners, "block could not be rectified");
                return Err(OmrError::DegenerateQuad { block: index });
            };
            let reading = read_block(&block, config, &self.decision, &corners)?;
            debug!(block = index, questions = reading.answers.len(), "block decoded");
            blocks.push(reading);
        }

        let reading = SheetReading { blocks };
        let questions: usize = reading.blocks.iter().map(|b| b.answers.len()).sum();
        info!(questions, "sheet decoded");
        Ok(reading)
    }
}

/// Decode `raw` with the reference vision settings and the given blocks.
///
/// Blocks are warped to the reference 800×1200 size, so every block's rows
/// and columns must divide it.
pub fn decode_sheet(raw: DynamicImage, blocks: &[BlockConfig]) -> Result<AnswerVector> {
    let layout = SheetLayout {
        blocks: blocks.to_vec(),
        ..SheetLayout::default()
    };
    SheetDecoder::from_parts(layout, VisionParams::default(), DecisionRule::default())?
        .decode(raw)
}

/// Bind the first `required` candidates (largest first) to the configured
/// blocks.
///
/// With [`BlockAssignment::AreaRank`] the N-th largest candidate is block N.
/// With [`BlockAssignment::ReadingOrder`] the chosen candidates are grouped
/// into columns, columns are taken left to right, and blocks within a column
/// top to bottom, all by centroid.
pub fn assign_blocks(
    mut candidates: Vec<Quad>,
    required: usize,
    assignment: BlockAssignment,
) -> Result<Vec<Quad>> {
    if candidates.len() < required {
        warn!(found = candidates.len(), required, "too few block candidates");
        return Err(OmrError::InsufficientCandidates {
            found: candidates.len(),
            required,
        });
    }
    candidates.truncate(required);

    if assignment == BlockAssignment::AreaRank {
        return Ok(candidates);
    }

    candidates.sort_by(|a, b| a.centroid().0.total_cmp(&b.centroid().0));
    let mut columns: Vec<Vec<Quad>> = Vec::new();
    for quad in candidates {
        match columns.last_mut() {
            Some(members) if members.iter().any(|m| share_column(m, &quad)) => {
                members.push(quad);
            }
            _ => columns.push(vec![quad]),
        }
    }

    Ok(columns
        .into_iter()
        .flat_map(|mut members| {
            members.sort_by(|a, b| a.centroid().1.total_cmp(&b.centroid().1));
            members
        })
        .collect())
}

/// Stacked quads: each centroid lies within the other's horizontal extent.
/// Side-by-side blocks of a tilted photo overlap in extent but not in this.
fn share_column(a: &Quad, b: &Quad) -> bool {
    let spans = |q: &Quad, x: f64| {
        let (min_x, _, max_x, _) = q.bounds();
        f64::from(min_x) <= x && x <= f64::from(max_x)
    };
    spans(a, b.centroid().0) && spans(b, a.centroid().0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;

    fn quad(x: i32, y: i32, w: i32, h: i32) -> Quad {
        Quad {
            corners: [
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x, y + h),
                Point::new(x + w, y + h),
            ],
            area: (w * h) as f64,
        }
    }

    #[test]
    fn too_few_candidates_is_fatal() {
        let err = assign_blocks(vec![quad(0, 0, 10, 10)], 2, BlockAssignment::AreaRank)
            .unwrap_err();
        assert!(matches!(
            err,
            OmrError::InsufficientCandidates {
                found: 1,
                required: 2
            }
        ));
    }

    #[test]
    fn area_rank_keeps_the_largest_first() {
        let right_big = quad(400, 100, 350, 1000);
        let left_small = quad(40, 100, 340, 1000);
        let extra = quad(10, 10, 20, 20);
        let assigned = assign_blocks(
            vec![right_big.clone(), left_small.clone(), extra],
            2,
            BlockAssignment::AreaRank,
        )
        .expect("enough candidates");
        assert_eq!(assigned, vec![right_big, left_small]);
    }

    #[test]
    fn reading_order_is_left_to_right() {
        let right_big = quad(400, 100, 350, 1000);
        let left_small = quad(40, 100, 340, 1000);
        let assigned = assign_blocks(
            vec![right_big.clone(), left_small.clone()],
            2,
            BlockAssignment::ReadingOrder,
        )
        .expect("enough candidates");
        assert_eq!(assigned, vec![left_small, right_big]);
    }

    #[test]
    fn reading_order_stacks_within_a_column() {
        let bottom = quad(50, 600, 300, 400);
        let top = quad(60, 100, 290, 400);
        let right = quad(420, 100, 300, 900);
        let assigned = assign_blocks(
            vec![right.clone(), bottom.clone(), top.clone()],
            3,
            BlockAssignment::ReadingOrder,
        )
        .expect("enough candidates");
        assert_eq!(assigned, vec![top, bottom, right]);
    }

    /// Rectangle turned by `theta` radians about the reference sheet centre.
    fn tilted(x: i32, y: i32, w: i32, h: i32, theta: f64) -> Quad {
        let (sin, cos) = theta.sin_cos();
        let turn = |p: Point<i32>| {
            let (dx, dy) = (f64::from(p.x) - 400.0, f64::from(p.y) - 600.0);
            Point::new(
                (400.0 + dx * cos - dy * sin).round() as i32,
                (600.0 + dx * sin + dy * cos).round() as i32,
            )
        };
        let upright = quad(x, y, w, h);
        Quad {
            corners: upright.corners.map(turn),
            area: upright.area,
        }
    }

    #[test]
    fn reading_order_survives_a_tilted_photo() {
        for theta in [-0.08f64, -0.05, -0.02, 0.02, 0.05, 0.08] {
            let left = tilted(40, 100, 340, 1000, theta);
            let right = tilted(420, 100, 340, 1000, theta);
            // The tilt makes the two outlines overlap horizontally.
            assert!(left.bounds().2 >= right.bounds().0 || theta.abs() < 0.04);

            let assigned = assign_blocks(
                vec![right.clone(), left.clone()],
                2,
                BlockAssignment::ReadingOrder,
            )
            .expect("enough candidates");
            assert_eq!(assigned, vec![left, right], "theta = {theta}");
        }
    }

    #[test]
    fn decoder_rejects_inverted_canny_thresholds() {
        let config = GraderConfig {
            vision: VisionParams {
                canny_low: 60.0,
                canny_high: 50.0,
                ..VisionParams::default()
            },
            ..GraderConfig::default()
        };
        assert!(matches!(
            SheetDecoder::new(&config),
            Err(OmrError::InvalidVision(_))
        ));
    }

    #[test]
    fn decoder_rejects_untileable_layout() {
        let config = GraderConfig {
            layout: SheetLayout {
                blocks: vec![BlockConfig::new(7, 5)],
                ..SheetLayout::default()
            },
            ..GraderConfig::default()
        };
        assert!(matches!(
            SheetDecoder::new(&config),
            Err(OmrError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn blank_photo_has_no_blocks() {
        let decoder = SheetDecoder::new(&GraderConfig::default()).expect("reference layout");
        let blank = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            400,
            600,
            image::Rgb([255, 255, 255]),
        ));
        assert!(matches!(
            decoder.decode(blank),
            Err(OmrError::InsufficientCandidates {
                found: 0,
                required: 2
            })
        ));
    }

    #[test]
    fn decoder_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<SheetDecoder>();
    }
}
