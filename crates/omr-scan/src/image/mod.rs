// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — loading, working-resolution resize, and edge-map preprocessing.

pub mod processor;

pub use processor::{ImageProcessor, gaussian_kernel};
