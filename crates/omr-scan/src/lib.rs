// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// omr-scan — Optical mark recognition for photographed answer sheets.
//
// Provides image preprocessing (resize, Gaussian smoothing, Canny edges), block
// location and perspective rectification, and the bubble-grid decision rule that
// turns a photograph into an answer vector.

pub mod image;
pub mod sheet;

// Re-export the primary structs so callers can use `omr_scan::SheetDecoder` etc.
pub use self::image::processor::ImageProcessor;
pub use sheet::{SheetDecoder, SheetReading, decode_sheet};
