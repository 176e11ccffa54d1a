// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — loading, resizing to the working resolution, and the
// grayscale → Gaussian smoothing → Canny edge map preprocessing chain.
// Operates on in-memory images using the `image` and `imageproc` crates.

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::dilate;
use omr_core::{OmrError, Result, VisionParams};
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory photograph.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so a
/// sheet can be prepared in one chain:
///
/// ```ignore
/// let processor = ImageProcessor::open("sheet.jpg")?.resize_exact(800, 1200);
/// let edges = processor.edge_map(&VisionParams::default());
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| match err {
            image::ImageError::IoError(io) => OmrError::Io(io),
            other => OmrError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                other
            )),
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Colour copy of the current image, the source for block warping.
    pub fn to_rgb(&self) -> RgbImage {
        self.image.to_rgb8()
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Resize the image to exactly `width` x `height`, ignoring aspect ratio.
    ///
    /// Photographs are stretched onto the working resolution so every later
    /// stage sees the same geometry.
    #[instrument(skip(self), fields(width, height))]
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        if self.image.width() == width && self.image.height() == height {
            return self;
        }
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            "Resizing to working resolution"
        );
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Triangle);
        Self { image: resized }
    }

    // -- Analysis -------------------------------------------------------------

    /// Binary edge map of the current image.
    ///
    /// Pipeline:
    /// 1. Grayscale conversion
    /// 2. Separable Gaussian smoothing with `blur_kernel` taps at `blur_sigma`
    /// 3. Canny edge detection with the `canny_low` / `canny_high` thresholds
    /// 4. Optional dilation so broken block outlines close into loops
    #[instrument(skip_all, fields(width = self.width(), height = self.height()))]
    pub fn edge_map(&self, params: &VisionParams) -> GrayImage {
        let gray = self.image.to_luma8();

        let kernel = gaussian_kernel(params.blur_kernel, params.blur_sigma);
        let blurred = separable_filter_equal(&gray, &kernel);
        debug!(taps = kernel.len(), sigma = params.blur_sigma, "Applied Gaussian blur");

        let edges = canny(&blurred, params.canny_low, params.canny_high);
        debug!(
            low = params.canny_low,
            high = params.canny_high,
            "Canny edge detection complete"
        );

        if params.edge_dilation == 0 {
            return edges;
        }
        dilate(&edges, Norm::LInf, params.edge_dilation)
    }
}

/// Normalized 1-D Gaussian kernel with `size` taps.
///
/// Even sizes are widened to the next odd size. A non-positive `sigma` is
/// derived from the size as `0.3 × ((size − 1) / 2 − 1) + 0.8`.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };

    let half = (size / 2) as i32;
    let weights: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
