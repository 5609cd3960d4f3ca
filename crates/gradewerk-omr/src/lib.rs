// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gradewerk-omr - Optical mark recognition for paper answer sheets.
//
// Locates the printed sheet in a photo (edge map, contour approximation),
// orders its corners, warps it to a canonical top-down image, binarizes it
// with a global threshold, and samples the bubble grid into one detected
// answer per question.

pub mod batch;
pub mod binarize;
pub mod corners;
pub mod grid;
pub mod locate;
pub mod rectify;
pub mod scanner;

pub use batch::{BatchItem, scan_batch, scan_isolated};
pub use binarize::binarize;
pub use corners::{CornerSet, order_contour_corners, order_corners};
pub use grid::{CellCounts, count_cells, detect_marks, sample_grid};
pub use locate::locate_sheet;
pub use rectify::rectify;
pub use scanner::SheetScanner;
