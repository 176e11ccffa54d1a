// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the command line to the omr backend crates.
//
// Each service wraps one or more backend crate APIs in a way that is convenient
// for the CLI to call (async-friendly, returns data the reports can display).

pub mod catalog;
pub mod config_dir;
pub mod grading;
