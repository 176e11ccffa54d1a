// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bubble grid — splits a rectified block into question/alternative cells,
// counts the mark pixels in each, and decides every question's answer.

use image::GenericImageView;
use omr_core::{AnswerCode, BlockConfig, DecisionRule, OmrError, Result};
use serde::Serialize;

use super::geometry::Corners;
use super::rectify::RectifiedBlock;

/// One bubble of the grid, in rectified-block pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Row within the block.
    pub question: u32,
    /// Column within the row.
    pub alternative: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Partition a `width × height` block into `rows × columns` equal cells,
/// row-major.
pub fn partition(width: u32, height: u32, rows: u32, columns: u32) -> Result<Vec<Cell>> {
    if rows == 0 || columns == 0 || height % rows != 0 || width % columns != 0 {
        return Err(OmrError::DimensionMismatch {
            width,
            height,
            rows,
            columns,
        });
    }

    let (cell_width, cell_height) = (width / columns, height / rows);
    let mut cells = Vec::with_capacity((rows * columns) as usize);
    for question in 0..rows {
        for alternative in 0..columns {
            cells.push(Cell {
                question,
                alternative,
                x: alternative * cell_width,
                y: question * cell_height,
                width: cell_width,
                height: cell_height,
            });
        }
    }
    Ok(cells)
}

/// Number of foreground pixels inside `cell`.
pub fn count_marks(block: &RectifiedBlock, cell: &Cell) -> u32 {
    block
        .image
        .view(cell.x, cell.y, cell.width, cell.height)
        .pixels()
        .filter(|(_, _, p)| p.0[0] > 0)
        .count() as u32
}

/// Decide one question from the mark counts of its alternatives.
///
/// - no clear difference between darkest and lightest cell: blank
/// - runner-up close to the darkest: multiple marks
/// - otherwise the darkest alternative, the leftmost on a tie
pub fn decode_row(counts: &[u32], rule: &DecisionRule) -> AnswerCode {
    let Some(&max) = counts.iter().max() else {
        return AnswerCode::Blank;
    };
    let min = counts.iter().copied().min().unwrap_or(0);

    if max as f64 <= rule.blank_ratio * min as f64 {
        return AnswerCode::Blank;
    }

    let mut sorted = counts.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    if let Some(&runner_up) = sorted.get(1)
        && runner_up as f64 > rule.multi_ratio * max as f64
    {
        return AnswerCode::Multi;
    }

    let chosen = counts.iter().position(|&c| c == max).unwrap_or(0);
    AnswerCode::from_index(chosen).unwrap_or(AnswerCode::Blank)
}

/// Everything read from one answer block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockReading {
    /// Block corners in working-image pixels, `[tl, tr, bl, br]`.
    pub corners: [(i32, i32); 4],
    /// Mark pixels per cell, one inner vector per question.
    pub counts: Vec<Vec<u32>>,
    pub answers: Vec<AnswerCode>,
}

/// Count and decide every question of a rectified block.
pub fn read_block(
    block: &RectifiedBlock,
    config: &BlockConfig,
    rule: &DecisionRule,
    corners: &Corners,
) -> Result<BlockReading> {
    let cells = partition(block.width(), block.height(), config.rows, config.columns)?;

    let counts: Vec<Vec<u32>> = cells
        .chunks(config.columns as usize)
        .map(|row| row.iter().map(|cell| count_marks(block, cell)).collect())
        .collect();
    let answers = counts.iter().map(|row| decode_row(row, rule)).collect();

    Ok(BlockReading {
        corners: corners.map(|p| (p.x, p.y)),
        counts,
        answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::point::Point;
    use imageproc::rect::Rect;

    fn rule() -> DecisionRule {
        DecisionRule::default()
    }

    #[test]
    fn partition_tiles_the_block_exactly() {
        let cells = partition(800, 1200, 25, 5).expect("divides evenly");
        assert_eq!(cells.len(), 125);
        assert_eq!(
            cells[0],
            Cell {
                question: 0,
                alternative: 0,
                x: 0,
                y: 0,
                width: 160,
                height: 48
            }
        );
        let last = cells[124];
        assert_eq!((last.question, last.alternative), (24, 4));
        assert_eq!((last.x + last.width, last.y + last.height), (800, 1200));

        let mut coverage = vec![0u8; 800 * 1200];
        for cell in &cells {
            for y in cell.y..cell.y + cell.height {
                for x in cell.x..cell.x + cell.width {
                    coverage[(y * 800 + x) as usize] += 1;
                }
            }
        }
        assert!(coverage.iter().all(|&n| n == 1), "every pixel in exactly one cell");
    }

    #[test]
    fn partition_rejects_uneven_rows() {
        assert!(matches!(
            partition(800, 1200, 7, 5),
            Err(OmrError::DimensionMismatch { rows: 7, .. })
        ));
    }

    #[test]
    fn single_dark_cell_is_the_answer() {
        assert_eq!(decode_row(&[100, 100, 800, 100, 100], &rule()), AnswerCode::C);
    }

    #[test]
    fn reference_example_reads_c() {
        assert_eq!(decode_row(&[30, 40, 900, 35, 50], &rule()), AnswerCode::C);
    }

    #[test]
    fn close_counts_are_blank() {
        assert_eq!(decode_row(&[100, 110, 120, 130, 140], &rule()), AnswerCode::Blank);
    }

    #[test]
    fn all_zero_row_is_blank() {
        assert_eq!(decode_row(&[0, 0, 0, 0, 0], &rule()), AnswerCode::Blank);
    }

    #[test]
    fn empty_row_is_blank() {
        assert_eq!(decode_row(&[], &rule()), AnswerCode::Blank);
    }

    #[test]
    fn two_dark_cells_are_multi() {
        assert_eq!(decode_row(&[100, 900, 850, 100, 100], &rule()), AnswerCode::Multi);
    }

    #[test]
    fn runner_up_at_exactly_the_ratio_is_not_multi() {
        assert_eq!(decode_row(&[100, 1000, 800, 100, 100], &rule()), AnswerCode::B);
    }

    #[test]
    fn tie_between_maxima_is_multi() {
        assert_eq!(decode_row(&[50, 600, 600, 50, 50], &rule()), AnswerCode::Multi);
    }

    #[test]
    fn tie_under_a_permissive_rule_goes_to_the_leftmost() {
        let permissive = DecisionRule {
            blank_ratio: 1.5,
            multi_ratio: 1.0,
        };
        assert_eq!(decode_row(&[50, 600, 600, 50, 50], &permissive), AnswerCode::B);
    }

    #[test]
    fn zero_minimum_with_a_mark_is_decided() {
        assert_eq!(decode_row(&[0, 0, 0, 0, 300], &rule()), AnswerCode::E);
    }

    #[test]
    fn read_block_counts_each_cell() {
        let mut image = GrayImage::new(50, 20);
        // Question 0, alternative 3 fully marked.
        draw_filled_rect_mut(&mut image, Rect::at(30, 0).of_size(10, 10), Luma([255u8]));
        // Question 1, a faint smudge in every cell.
        for col in 0..5 {
            image.put_pixel(col * 10 + 5, 15, Luma([255u8]));
        }
        let block = RectifiedBlock { image };
        let corners = [(1, 2), (3, 4), (5, 6), (7, 8)].map(|(x, y)| Point::new(x, y));

        let reading = read_block(&block, &BlockConfig::new(2, 5), &rule(), &corners)
            .expect("divides evenly");
        assert_eq!(reading.counts, vec![vec![0, 0, 0, 100, 0], vec![1, 1, 1, 1, 1]]);
        assert_eq!(reading.answers, vec![AnswerCode::D, AnswerCode::Blank]);
        assert_eq!(reading.corners[3], (7, 8));
    }
}
