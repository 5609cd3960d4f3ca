// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch recognition - read many answer sheets, isolating each one so a bad
// photo yields its own error and never disturbs the others.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use gradewerk_core::error::{GradewerkError, Result};
use gradewerk_core::types::{DetectedAnswer, GridConfig, RecognitionReport};
use tracing::{info, instrument, warn};

use crate::scanner::SheetScanner;

/// Recognition outcome for one image of a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub source: PathBuf,
    pub outcome: Result<Vec<DetectedAnswer>>,
}

impl BatchItem {
    pub fn report(&self) -> RecognitionReport {
        RecognitionReport::from_result(&self.outcome)
    }
}

/// Read one image, turning a panic anywhere in the imaging stack into a
/// `Processing` error for that image alone.
pub fn scan_isolated(scanner: &SheetScanner, path: &Path, grid: &GridConfig) -> Result<Vec<DetectedAnswer>> {
    panic::catch_unwind(AssertUnwindSafe(|| scanner.scan_path(path, grid))).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unexpected failure".into());
        Err(GradewerkError::Processing(detail))
    })
}

/// Read every image in order. The output has one item per input path, in the
/// same order.
#[instrument(skip_all, fields(count = paths.len()))]
pub fn scan_batch(scanner: &SheetScanner, paths: &[PathBuf], grid: &GridConfig) -> Vec<BatchItem> {
    let items: Vec<BatchItem> = paths
        .iter()
        .map(|path| {
            let outcome = scan_isolated(scanner, path, grid);
            if let Err(err) = &outcome {
                warn!(path = %path.display(), error = %err, "Sheet rejected");
            }
            BatchItem {
                source: path.clone(),
                outcome,
            }
        })
        .collect();

    let failed = items.iter().filter(|item| item.outcome.is_err()).count();
    info!(total = items.len(), failed, "Batch recognition finished");
    items
}
