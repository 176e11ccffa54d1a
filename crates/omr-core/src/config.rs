// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grader configuration: sheet layout, vision parameters, decision rule, and
// grading policy. Defaults reproduce the reference two-block sheet.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{OmrError, Result};
use crate::types::MAX_ALTERNATIVES;

/// Complete grader settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    pub layout: SheetLayout,
    pub vision: VisionParams,
    pub decision: DecisionRule,
    pub grading: GradingPolicy,
    /// Grade awarded when every counted question is correct.
    pub full_scale: f64,
}

impl GraderConfig {
    /// Read a configuration file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        info!(path = %path.display(), blocks = config.layout.blocks.len(), "configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            layout: SheetLayout::default(),
            vision: VisionParams::default(),
            decision: DecisionRule::default(),
            grading: GradingPolicy::default(),
            full_scale: 10.0,
        }
    }
}

/// Row and column count of one printed answer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Questions in the block.
    pub rows: u32,
    /// Alternatives per question.
    pub columns: u32,
}

impl BlockConfig {
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }
}

/// Geometry of the sheet model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Every photograph is resized to this resolution before processing.
    pub working_width: u32,
    pub working_height: u32,
    /// Size of the upright image each block is warped into.
    pub block_width: u32,
    pub block_height: u32,
    /// Blocks in sheet order.
    pub blocks: Vec<BlockConfig>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            working_width: 800,
            working_height: 1200,
            block_width: 800,
            block_height: 1200,
            blocks: vec![BlockConfig::new(25, 5), BlockConfig::new(25, 5)],
        }
    }
}

impl SheetLayout {
    /// Total number of questions on the sheet.
    pub fn total_questions(&self) -> usize {
        self.blocks.iter().map(|b| b.rows as usize).sum()
    }

    /// Check that the layout describes a decodable sheet.
    ///
    /// Every block must tile the rectified block size exactly, so
    /// `block_height % rows == 0` and `block_width % columns == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(OmrError::InvalidLayout("no answer blocks configured".into()));
        }
        if self.working_width == 0 || self.working_height == 0 {
            return Err(OmrError::InvalidLayout(format!(
                "working resolution {}x{} is empty",
                self.working_width, self.working_height
            )));
        }
        if self.block_width == 0 || self.block_height == 0 {
            return Err(OmrError::InvalidLayout(format!(
                "block size {}x{} is empty",
                self.block_width, self.block_height
            )));
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if block.rows == 0 {
                return Err(OmrError::InvalidLayout(format!("block {index} has no rows")));
            }
            if block.columns == 0 || block.columns > MAX_ALTERNATIVES {
                return Err(OmrError::InvalidLayout(format!(
                    "block {index} has {} columns, expected 1..={MAX_ALTERNATIVES}",
                    block.columns
                )));
            }
            if self.block_height % block.rows != 0 || self.block_width % block.columns != 0 {
                return Err(OmrError::DimensionMismatch {
                    width: self.block_width,
                    height: self.block_height,
                    rows: block.rows,
                    columns: block.columns,
                });
            }
        }
        Ok(())
    }
}

/// How located rectangles are bound to configured blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockAssignment {
    /// The N-th largest rectangle is block N.
    AreaRank,
    /// The N largest rectangles, ordered left to right (then top to bottom).
    #[default]
    ReadingOrder,
}

/// Thresholds and tolerances of the image pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionParams {
    /// Side of the square Gaussian kernel (odd).
    pub blur_kernel: u32,
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Pixels the edge map is grown by before contour tracing (0 = off).
    pub edge_dilation: u8,
    /// Contours enclosing less area (px²) than this are noise.
    pub min_contour_area: f64,
    /// Polygon approximation tolerance as a fraction of the perimeter.
    pub approx_epsilon_ratio: f64,
    /// Gray level above which a rectified pixel counts as background.
    pub mark_threshold: u8,
    /// Accepted bounding-box width/height range for block candidates.
    pub min_block_aspect: f64,
    pub max_block_aspect: f64,
    pub assignment: BlockAssignment,
}

impl Default for VisionParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            blur_sigma: 1.0,
            canny_low: 10.0,
            canny_high: 50.0,
            edge_dilation: 1,
            min_contour_area: 40.0,
            approx_epsilon_ratio: 0.02,
            mark_threshold: 150,
            min_block_aspect: 0.2,
            max_block_aspect: 5.0,
            assignment: BlockAssignment::ReadingOrder,
        }
    }
}

impl VisionParams {
    /// Check that the image pipeline can run with these settings.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("blur_sigma", f64::from(self.blur_sigma)),
            ("canny_low", f64::from(self.canny_low)),
            ("canny_high", f64::from(self.canny_high)),
            ("min_contour_area", self.min_contour_area),
            ("approx_epsilon_ratio", self.approx_epsilon_ratio),
            ("min_block_aspect", self.min_block_aspect),
            ("max_block_aspect", self.max_block_aspect),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(OmrError::InvalidVision(format!("{name} is {value}")));
        }
        if self.blur_kernel == 0 {
            return Err(OmrError::InvalidVision("blur_kernel must be at least 1".into()));
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return Err(OmrError::InvalidVision(format!(
                "canny_low {} must be between 0 and canny_high {}",
                self.canny_low, self.canny_high
            )));
        }
        if self.approx_epsilon_ratio <= 0.0 {
            return Err(OmrError::InvalidVision(format!(
                "approx_epsilon_ratio {} must be positive",
                self.approx_epsilon_ratio
            )));
        }
        if self.min_block_aspect <= 0.0 || self.min_block_aspect > self.max_block_aspect {
            return Err(OmrError::InvalidVision(format!(
                "block aspect range {}..{} is empty",
                self.min_block_aspect, self.max_block_aspect
            )));
        }
        Ok(())
    }
}

/// Ratios of the per-question answer decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionRule {
    /// The darkest cell must exceed `blank_ratio × lightest` to count.
    pub blank_ratio: f64,
    /// A runner-up above `multi_ratio × darkest` makes the row ambiguous.
    pub multi_ratio: f64,
}

impl Default for DecisionRule {
    fn default() -> Self {
        Self {
            blank_ratio: 1.5,
            multi_ratio: 0.8,
        }
    }
}

/// Which key positions count towards the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradingPolicy {
    /// Blank or ambiguous key questions are annulled and leave the
    /// denominator.
    #[default]
    ValidKeyOnly,
    /// Plain positional equality, `Blank == Blank` included.
    ExactMatch,
}
