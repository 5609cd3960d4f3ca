// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// batch - read and grade many answer sheets concurrently.
//
// Every image runs on tokio's blocking pool, capped at `--jobs` threads.
// Results are printed in input order regardless of completion order, and a
// failed image only fails its own line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use gradewerk_core::AppConfig;
use gradewerk_core::error::GradewerkError;
use gradewerk_core::types::{GradingResult, GridConfig, RecognitionReport};
use gradewerk_omr::{BatchItem, SheetScanner, scan_isolated};
use gradewerk_store::{StoredSubmission, SubmissionStore, hash_file};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use super::{ExitCode, GridArgs, database_path, load_answer_key};

#[derive(Args, Clone, Debug)]
pub struct BatchArgs {
    /// Answer key (JSON)
    #[arg(long, value_name = "FILE")]
    pub key: PathBuf,

    /// Answer-sheet images to read and grade
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Store graded submissions in this SQLite database
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Test the submissions belong to (required when storing)
    #[arg(long, value_name = "ID")]
    pub test_id: Option<String>,

    /// Maximum number of images processed at once
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,
}

/// One output line.
#[derive(Serialize)]
struct BatchLine {
    source: String,
    #[serde(flatten)]
    report: RecognitionReport,
    result: Option<GradingResult>,
}

pub fn run(args: &BatchArgs, config: &AppConfig) -> Result<ExitCode> {
    let key = load_answer_key(&args.key)?;
    let grid = args.grid.resolve(&config.grid, Some(key.len()))?;
    let scanner = Arc::new(SheetScanner::new(config.omr.clone())?);

    let store = match database_path(args.db.as_deref(), config) {
        Some(path) => {
            let Some(test_id) = args.test_id.clone() else {
                anyhow::bail!("--test-id is required when storing submissions");
            };
            let store = SubmissionStore::open(&path)
                .with_context(|| format!("opening database {}", path.display()))?;
            Some((store, test_id))
        }
        None => None,
    };

    let jobs = args.jobs.map(usize::from).unwrap_or_else(default_jobs);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(jobs)
        .enable_all()
        .build()
        .context("starting worker pool")?;
    let items = runtime.block_on(scan_concurrently(scanner, args.images.clone(), grid));

    let mut failed = 0usize;
    for item in &items {
        let result = match &item.outcome {
            Ok(answers) => match key.grade(answers) {
                Ok(result) => Some(result),
                Err(err) => {
                    warn!(path = %item.source.display(), error = %err, "Grading failed");
                    failed += 1;
                    None
                }
            },
            Err(_) => {
                failed += 1;
                None
            }
        };

        if let (Some((store, test_id)), Ok(answers), Some(result)) = (&store, &item.outcome, &result) {
            let submission = StoredSubmission::new(
                test_id.as_str(),
                source_name(&item.source),
                hash_file(&item.source).ok(),
                answers.clone(),
                result,
            );
            if let Err(err) = store.insert(&submission) {
                warn!(path = %item.source.display(), error = %err, "Could not store submission");
                failed += 1;
            }
        }

        let line = BatchLine {
            source: item.source.display().to_string(),
            report: item.report(),
            result,
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    info!(total = items.len(), failed, "Batch finished");
    Ok(if failed == 0 {
        ExitCode::Success
    } else {
        ExitCode::Error
    })
}

/// Read every image on the blocking pool. The output holds one item per
/// input path, in input order.
#[instrument(skip_all, fields(count = paths.len()))]
async fn scan_concurrently(
    scanner: Arc<SheetScanner>,
    paths: Vec<PathBuf>,
    grid: GridConfig,
) -> Vec<BatchItem> {
    let mut tasks = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        let scanner = Arc::clone(&scanner);
        tasks.spawn_blocking(move || {
            let outcome = scan_isolated(&scanner, &path, &grid);
            if let Err(err) = &outcome {
                warn!(path = %path.display(), error = %err, "Sheet rejected");
            }
            (index, BatchItem { source: path, outcome })
        });
    }

    let mut slots: Vec<Option<BatchItem>> = paths.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, item)) => slots[index] = Some(item),
            Err(err) => warn!(error = %err, "Recognition task did not complete"),
        }
    }

    slots
        .into_iter()
        .zip(paths)
        .map(|(slot, source)| {
            slot.unwrap_or_else(|| BatchItem {
                source,
                outcome: Err(GradewerkError::Processing("recognition task did not complete".into())),
            })
        })
        .collect()
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(4)
}
