// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scan - print the detected answers of each image as one JSON line.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gradewerk_core::AppConfig;
use gradewerk_core::types::RecognitionReport;
use gradewerk_omr::{SheetScanner, scan_batch};
use serde::Serialize;
use tracing::info;

use super::{ExitCode, GridArgs};

#[derive(Args, Clone, Debug)]
pub struct ScanArgs {
    /// Answer-sheet images to read
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    #[command(flatten)]
    pub grid: GridArgs,
}

/// One output line.
#[derive(Serialize)]
struct ScanLine {
    source: String,
    #[serde(flatten)]
    report: RecognitionReport,
}

pub fn run(args: &ScanArgs, config: &AppConfig) -> Result<ExitCode> {
    let grid = args.grid.resolve(&config.grid, None)?;
    let scanner = SheetScanner::new(config.omr.clone())?;

    let items = scan_batch(&scanner, &args.images, &grid);
    for item in &items {
        let line = ScanLine {
            source: item.source.display().to_string(),
            report: item.report(),
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    let failed = items.iter().filter(|item| item.outcome.is_err()).count();
    info!(read = items.len() - failed, failed, "Scan finished");
    Ok(if failed == 0 {
        ExitCode::Success
    } else {
        ExitCode::Error
    })
}
