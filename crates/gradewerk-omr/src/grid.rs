// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bubble grid sampling and mark detection.
//
// The binarized sheet is cut into `num_questions` equal bands, each band into
// `num_options` equal cells, and every cell's ink pixels are counted. A cell
// is marked when its ink count strictly exceeds `darkness_threshold` of the
// cell area.

use gradewerk_core::error::{GradewerkError, Result};
use gradewerk_core::types::{DetectedAnswer, GridConfig};
use image::GrayImage;
use image::imageops::{self, FilterType};
use tracing::{debug, instrument};

/// Ink pixel counts for every cell of the bubble grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCounts {
    /// Pixels per cell; identical for every cell.
    pub cell_area: u64,
    /// `counts[question][option]` is the number of ink pixels in that cell.
    pub counts: Vec<Vec<u64>>,
}

impl CellCounts {
    /// Fraction of each cell covered by ink.
    pub fn fill_ratios(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| row.iter().map(|&c| c as f64 / self.cell_area as f64).collect())
            .collect()
    }
}

/// Count ink pixels per grid cell.
///
/// When the mask's dimensions are not exact multiples of the grid shape, it is
/// first resized down to the nearest multiples (nearest-neighbour, so the mask
/// stays binary), which makes every band and cell exactly the same size.
/// A bilinear resize followed by counting non-zero pixels would instead
/// smear ink into the paper pixels along stroke edges, so counts near cell
/// borders come out somewhat higher than they do here.
#[instrument(skip(mask), fields(width = mask.width(), height = mask.height()))]
pub fn count_cells(mask: &GrayImage, grid: &GridConfig) -> Result<CellCounts> {
    grid.validate()?;

    let (width, height) = mask.dimensions();
    let rows = u32::try_from(grid.num_questions)
        .map_err(|_| GradewerkError::InvalidConfig("too many questions".into()))?;
    let cols = u32::try_from(grid.num_options)
        .map_err(|_| GradewerkError::InvalidConfig("too many options".into()))?;

    let target_height = (height / rows) * rows;
    let target_width = (width / cols) * cols;
    if target_height == 0 || target_width == 0 {
        return Err(GradewerkError::Processing(format!(
            "{width}x{height} sheet is too small for a {rows}x{cols} grid"
        )));
    }

    let resized;
    let mask = if (target_width, target_height) != (width, height) {
        debug!(target_width, target_height, "Resizing mask to an even grid");
        resized = imageops::resize(mask, target_width, target_height, FilterType::Nearest);
        &resized
    } else {
        mask
    };

    let cell_height = target_height / rows;
    let cell_width = target_width / cols;
    let mut counts = vec![vec![0u64; grid.num_options]; grid.num_questions];

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] != 0 {
            counts[(y / cell_height) as usize][(x / cell_width) as usize] += 1;
        }
    }

    Ok(CellCounts {
        cell_area: cell_width as u64 * cell_height as u64,
        counts,
    })
}

/// Decide which cells are marked and collect one answer per question.
///
/// No marked cell gives `NoAnswer`, one gives `Single`, several give
/// `Multiple` with ascending option indices.
pub fn detect_marks(cells: &CellCounts, darkness_threshold: f64) -> Vec<DetectedAnswer> {
    let min_ink = cells.cell_area as f64 * darkness_threshold;
    cells
        .counts
        .iter()
        .map(|row| {
            let marked = row
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count as f64 > min_ink)
                .map(|(option, _)| option)
                .collect();
            DetectedAnswer::from_marks(marked)
        })
        .collect()
}

/// Sample the grid of a binarized sheet and return the detected answers,
/// one per question.
pub fn sample_grid(mask: &GrayImage, grid: &GridConfig) -> Result<Vec<DetectedAnswer>> {
    let cells = count_cells(mask, grid)?;
    let answers = detect_marks(&cells, grid.darkness_threshold);
    debug!(
        answered = answers.iter().filter(|a| a.is_answered()).count(),
        questions = answers.len(),
        "Marks detected"
    );
    Ok(answers)
}
