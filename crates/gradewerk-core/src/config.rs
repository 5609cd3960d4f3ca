// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition tuning and application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GradewerkError, Result};
use crate::types::GridConfig;

/// Tuning parameters for the recognition pipeline.
///
/// The defaults reproduce the reference answer-sheet layout: a 550 x 700
/// working image, a 550 x 700 rectified sheet and a global ink threshold of 150.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmrConfig {
    /// Width the photo is resized to before edge detection.
    pub working_width: u32,
    /// Height the photo is resized to before edge detection.
    pub working_height: u32,
    /// Width of the rectified sheet.
    pub sheet_width: u32,
    /// Height of the rectified sheet.
    pub sheet_height: u32,
    /// Gaussian blur sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub polygon_tolerance: f64,
    /// Pixels at or below this intensity are ink.
    pub ink_threshold: u8,
}

impl Default for OmrConfig {
    fn default() -> Self {
        Self {
            working_width: 550,
            working_height: 700,
            sheet_width: 550,
            sheet_height: 700,
            blur_sigma: 1.0,
            canny_low: 10.0,
            canny_high: 50.0,
            polygon_tolerance: 0.02,
            ink_threshold: 150,
        }
    }
}

impl OmrConfig {
    pub fn validate(&self) -> Result<()> {
        if self.working_width == 0 || self.working_height == 0 {
            return Err(GradewerkError::InvalidConfig(
                "working image size must be non-zero".into(),
            ));
        }
        if self.sheet_width == 0 || self.sheet_height == 0 {
            return Err(GradewerkError::InvalidConfig(
                "sheet size must be non-zero".into(),
            ));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(GradewerkError::InvalidConfig(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(GradewerkError::InvalidConfig(format!(
                "canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.polygon_tolerance > 0.0) {
            return Err(GradewerkError::InvalidConfig(format!(
                "polygon_tolerance must be positive, got {}",
                self.polygon_tolerance
            )));
        }
        Ok(())
    }
}

/// Settings for the `gradewerk` binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition tuning.
    pub omr: OmrConfig,
    /// Grid shape used when the command line does not override it.
    pub grid: GridConfig,
    /// SQLite database for graded submissions, if persistence is wanted.
    pub database: Option<PathBuf>,
}

impl AppConfig {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.omr.validate()?;
        self.grid.validate()
    }
}
