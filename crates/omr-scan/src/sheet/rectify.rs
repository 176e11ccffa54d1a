// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Block rectifier — warps a located block upright and binarizes it so that
// pencil marks become foreground.

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::contrast::{ThresholdType, threshold_mut};
use imageproc::geometric_transformations::{Interpolation, warp_into};
use tracing::{debug, instrument};

use super::geometry::{Corners, bounding_box, canonicalize_quad, perspective_map};

/// A block warped to the configured size, with marks as non-zero pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RectifiedBlock {
    pub image: GrayImage,
}

impl RectifiedBlock {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Perspective-corrects and thresholds answer blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRectifier {
    width: u32,
    height: u32,
    threshold: u8,
}

impl BlockRectifier {
    /// `threshold` is the gray level above which a pixel is background.
    pub fn new(width: u32, height: u32, threshold: u8) -> Self {
        Self {
            width,
            height,
            threshold,
        }
    }

    /// Warp the region bounded by `corners` in `sheet` to an upright
    /// `width × height` block and invert-threshold it.
    ///
    /// Returns `None` if the corners have no extent or no perspective map
    /// exists for them.
    #[instrument(skip_all, fields(width = self.width, height = self.height))]
    pub fn rectify(&self, corners: &Corners, sheet: &RgbImage) -> Option<RectifiedBlock> {
        let (x0, y0, x1, y1) = bounding_box(corners);
        if x1 <= x0 || y1 <= y0 {
            debug!("block corners have no extent");
            return None;
        }

        let canonical = canonicalize_quad(corners)?;
        let projection = perspective_map(&canonical, self.width, self.height)?;

        let mut warped = RgbImage::new(self.width, self.height);
        warp_into(
            sheet,
            &projection,
            Interpolation::Bilinear,
            Rgb([255, 255, 255]),
            &mut warped,
        );

        let mut gray = DynamicImage::ImageRgb8(warped).into_luma8();
        threshold_mut(&mut gray, self.threshold, ThresholdType::BinaryInverted);

        Some(RectifiedBlock { image: gray })
    }
}
