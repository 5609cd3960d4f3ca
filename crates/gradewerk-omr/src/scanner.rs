// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer-sheet recognition pipeline - load a photo, find and rectify the
// sheet, binarize it, and read one answer per question from the bubble grid.

use std::path::Path;

use gradewerk_core::OmrConfig;
use gradewerk_core::error::{GradewerkError, Result};
use gradewerk_core::types::{DetectedAnswer, GridConfig};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, info, instrument};

use crate::binarize::binarize;
use crate::corners::order_contour_corners;
use crate::grid::sample_grid;
use crate::locate::locate_sheet;
use crate::rectify::rectify;

/// Reads filled bubbles from photographed or scanned answer sheets.
///
/// The scanner holds only its tuning parameters; every call runs the whole
/// pipeline from scratch and shares nothing with other calls, so one scanner
/// can serve any number of threads.
///
/// ## Pipeline
///
/// 1. Resize the photo to the working size and convert to grayscale
/// 2. Gaussian blur, then Canny edge detection
/// 3. Locate the largest four-sided external contour
/// 4. Label its corners and warp the grayscale photo onto the canonical sheet
/// 5. Binarize with the global ink threshold
/// 6. Count ink per grid cell and collect the marked options per question
#[derive(Debug, Clone, Default)]
pub struct SheetScanner {
    config: OmrConfig,
}

impl SheetScanner {
    // -- Construction ---------------------------------------------------------

    /// Create a scanner, rejecting invalid tuning parameters.
    pub fn new(config: OmrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OmrConfig {
        &self.config
    }

    // -- Recognition entry points ---------------------------------------------

    /// Read the answers from an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn scan_path(&self, path: impl AsRef<Path>, grid: &GridConfig) -> Result<Vec<DetectedAnswer>> {
        let image = image::open(path.as_ref()).map_err(|err| {
            GradewerkError::ImageRead(format!("{}: {}", path.as_ref().display(), err))
        })?;
        self.scan_image(&image, grid)
    }

    /// Read the answers from encoded image bytes (JPEG, PNG, BMP, ...).
    #[instrument(skip(self, data, grid), fields(data_len = data.len()))]
    pub fn scan_bytes(&self, data: &[u8], grid: &GridConfig) -> Result<Vec<DetectedAnswer>> {
        let image = image::load_from_memory(data)
            .map_err(|err| GradewerkError::ImageRead(err.to_string()))?;
        self.scan_image(&image, grid)
    }

    /// Read the answers from an already decoded image.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn scan_image(&self, image: &DynamicImage, grid: &GridConfig) -> Result<Vec<DetectedAnswer>> {
        grid.validate()?;
        let mask = self.rectified_mask(image)?;
        let answers = sample_grid(&mask, grid)?;
        info!(
            questions = answers.len(),
            answered = answers.iter().filter(|a| a.is_answered()).count(),
            "Answer sheet read"
        );
        Ok(answers)
    }

    // -- Pipeline stages -------------------------------------------------------

    /// Locate and rectify the sheet, returning the canonical-size grayscale
    /// image before binarization.
    #[instrument(skip_all)]
    pub fn rectified_sheet(&self, image: &DynamicImage) -> Result<GrayImage> {
        let config = &self.config;
        if image.width() == 0 || image.height() == 0 {
            return Err(GradewerkError::ImageRead("image has no pixels".into()));
        }

        let gray = image
            .resize_exact(config.working_width, config.working_height, FilterType::Triangle)
            .to_luma8();
        debug!(
            width = config.working_width,
            height = config.working_height,
            "Resized to working size"
        );

        let blurred = gaussian_blur_f32(&gray, config.blur_sigma);
        let edges = canny(&blurred, config.canny_low, config.canny_high);
        debug!(low = config.canny_low, high = config.canny_high, "Edge map computed");

        let quad = locate_sheet(&edges, config.polygon_tolerance)?;
        let corners = order_contour_corners(quad);
        debug!(
            top_left = ?corners.top_left,
            top_right = ?corners.top_right,
            bottom_right = ?corners.bottom_right,
            bottom_left = ?corners.bottom_left,
            "Sheet corners ordered"
        );

        rectify(&gray, &corners, config.sheet_width, config.sheet_height)
    }

    /// Locate, rectify and binarize the sheet.
    pub fn rectified_mask(&self, image: &DynamicImage) -> Result<GrayImage> {
        let sheet = self.rectified_sheet(image)?;
        Ok(binarize(&sheet, self.config.ink_threshold))
    }
}
