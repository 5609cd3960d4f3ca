// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command definitions and the helpers they share.

pub mod batch;
pub mod export;
pub mod grade;
pub mod scan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gradewerk_core::AppConfig;
use gradewerk_core::types::GridConfig;
use gradewerk_grading::AnswerKey;
use tracing::debug;

/// Gradewerk - optical mark recognition and grading for answer sheets
#[derive(Parser)]
#[command(name = "gradewerk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON settings file (recognition tuning, default grid, database)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the marked answers from answer-sheet images
    Scan(scan::ScanArgs),
    /// Grade one submission against an answer key
    Grade(grade::GradeArgs),
    /// Read and grade many sheets concurrently
    Batch(batch::BatchArgs),
    /// Print the CSV class report for a test
    Export(export::ExportArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    /// Usage or configuration error, or at least one item failed.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::Error => Self::FAILURE,
        }
    }
}

/// Grid shape overrides shared by the recognition commands.
#[derive(Args, Clone, Debug, Default)]
pub struct GridArgs {
    /// Number of question rows on the sheet
    #[arg(long, value_name = "N")]
    pub questions: Option<usize>,

    /// Number of options per question
    #[arg(long, value_name = "K")]
    pub options: Option<usize>,

    /// Fraction of a bubble that must be inked (0.0-1.0]
    #[arg(long, value_name = "RATIO", value_parser = parse_darkness)]
    pub darkness: Option<f64>,
}

impl GridArgs {
    /// Command line first, then the answer key's length (for the question
    /// count), then the configured grid.
    pub fn resolve(&self, base: &GridConfig, key_questions: Option<usize>) -> Result<GridConfig> {
        let grid = GridConfig::new(
            self.questions.or(key_questions).unwrap_or(base.num_questions),
            self.options.unwrap_or(base.num_options),
            self.darkness.unwrap_or(base.darkness_threshold),
        )?;
        debug!(?grid, "Grid resolved");
        Ok(grid)
    }
}

fn parse_darkness(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not in (0.0, 1.0]"))
    }
}

/// Settings from `--config`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

pub fn load_answer_key(path: &Path) -> Result<AnswerKey> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading answer key {}", path.display()))?;
    let key = AnswerKey::from_json(&json)
        .with_context(|| format!("parsing answer key {}", path.display()))?;
    if key.is_empty() {
        anyhow::bail!("answer key {} has no questions", path.display());
    }
    Ok(key)
}

/// `--db` if given, otherwise the configured database.
pub fn database_path(flag: Option<&Path>, config: &AppConfig) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| config.database.clone())
}
