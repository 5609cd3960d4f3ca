// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// export - print the CSV class report of a stored test.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gradewerk_core::AppConfig;
use gradewerk_grading::{SubmissionSummary, class_average, export_csv};
use gradewerk_store::{StoredSubmission, SubmissionStore};
use tracing::info;

use super::{ExitCode, database_path};

#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    /// SQLite database holding the graded submissions
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Test to report on
    #[arg(long, value_name = "ID")]
    pub test_id: String,

    /// Number of question columns (defaults to the longest stored submission)
    #[arg(long, value_name = "N")]
    pub questions: Option<usize>,
}

pub fn run(args: &ExportArgs, config: &AppConfig) -> Result<ExitCode> {
    let Some(path) = database_path(args.db.as_deref(), config) else {
        anyhow::bail!("no database given; pass --db or set \"database\" in the settings file");
    };
    let store = SubmissionStore::open(&path)
        .with_context(|| format!("opening database {}", path.display()))?;

    let summaries: Vec<SubmissionSummary> = store
        .list_for_test(&args.test_id)?
        .iter()
        .map(to_summary)
        .collect();

    let questions = args
        .questions
        .unwrap_or_else(|| summaries.iter().map(|s| s.total).max().unwrap_or(0));

    print!("{}", export_csv(&summaries, questions));
    info!(
        test_id = %args.test_id,
        submissions = summaries.len(),
        class_average = class_average(&summaries),
        "Report exported"
    );
    Ok(ExitCode::Success)
}

fn to_summary(submission: &StoredSubmission) -> SubmissionSummary {
    SubmissionSummary {
        name: submission.display_name().to_string(),
        score: submission.score,
        total: submission.total,
        percentage: submission.percentage,
        submitted_at: submission.submitted_at,
        answers: submission.answers.clone(),
    }
}
