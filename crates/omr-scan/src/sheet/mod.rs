// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet module — block location, rectification, bubble grid decoding, and
// the end-to-end sheet decoder.

pub mod decoder;
pub mod geometry;
pub mod grid;
pub mod locate;
pub mod rectify;

pub use decoder::{SheetDecoder, SheetReading, assign_blocks, decode_sheet};
pub use geometry::{Corners, canonicalize_quad, perspective_map};
pub use grid::{BlockReading, Cell, decode_row, partition};
pub use locate::{BlockLocator, Quad};
pub use rectify::{BlockRectifier, RectifiedBlock};
