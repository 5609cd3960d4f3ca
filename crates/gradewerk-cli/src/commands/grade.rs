// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// grade - score one submission, given either as detected answers in JSON or
// as an answer-sheet image, and print the grading result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gradewerk_core::AppConfig;
use gradewerk_core::types::DetectedAnswer;
use gradewerk_omr::SheetScanner;
use tracing::info;

use super::{ExitCode, GridArgs, load_answer_key};

#[derive(Args, Clone, Debug)]
pub struct GradeArgs {
    /// Answer key (JSON)
    #[arg(long, value_name = "FILE")]
    pub key: PathBuf,

    /// Detected answers (JSON array of null | int | [int])
    #[arg(long, value_name = "FILE", conflicts_with = "image")]
    pub answers: Option<PathBuf>,

    /// Answer-sheet image to read and grade
    #[arg(required_unless_present = "answers")]
    pub image: Option<PathBuf>,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: &GradeArgs, config: &AppConfig) -> Result<ExitCode> {
    let key = load_answer_key(&args.key)?;

    let detected: Vec<DetectedAnswer> = match (&args.answers, &args.image) {
        (Some(path), _) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading answers {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("parsing answers {}", path.display()))?
        }
        (None, Some(image)) => {
            let grid = args.grid.resolve(&config.grid, Some(key.len()))?;
            let scanner = SheetScanner::new(config.omr.clone())?;
            scanner.scan_path(image, &grid)?
        }
        (None, None) => anyhow::bail!("give either --answers or an image"),
    };

    let result = key.grade(&detected)?;
    info!(
        score = result.score,
        total = result.total,
        percentage = result.percentage,
        "Submission graded"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(ExitCode::Success)
}
