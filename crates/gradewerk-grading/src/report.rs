// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Class reports - ranking, letter grades, summary statistics and CSV export
// of graded submissions for one test.

use chrono::{DateTime, Utc};
use gradewerk_core::types::DetectedAnswer;
use serde::{Deserialize, Serialize};

use crate::engine::round2;

/// Percentage at or above which a submission passes.
pub const PASS_PERCENTAGE: f64 = 60.0;

const OPTION_LETTERS: [&str; 5] = ["A", "B", "C", "D", "E"];

/// One graded submission as it appears in a class report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub name: String,
    pub score: f64,
    pub total: usize,
    pub percentage: f64,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<DetectedAnswer>,
}

/// Aggregate figures over a set of submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    pub submissions: usize,
    pub average_score: f64,
    pub average_percentage: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub passed: usize,
}

impl ClassStatistics {
    /// `None` when there are no submissions.
    pub fn compute(submissions: &[SubmissionSummary]) -> Option<Self> {
        if submissions.is_empty() {
            return None;
        }
        let n = submissions.len() as f64;
        let scores = submissions.iter().map(|s| s.score);
        Some(Self {
            submissions: submissions.len(),
            average_score: submissions.iter().map(|s| s.score).sum::<f64>() / n,
            average_percentage: submissions.iter().map(|s| s.percentage).sum::<f64>() / n,
            highest_score: scores.clone().fold(f64::MIN, f64::max),
            lowest_score: scores.fold(f64::MAX, f64::min),
            passed: submissions
                .iter()
                .filter(|s| s.percentage >= PASS_PERCENTAGE)
                .count(),
        })
    }

    /// Passing share in percent.
    pub fn pass_rate(&self) -> f64 {
        self.passed as f64 / self.submissions as f64 * 100.0
    }
}

/// Letter grade for a percentage: A >= 90, B >= 80, C >= 70, D >= 60, else F.
pub fn letter_grade(percentage: f64) -> char {
    match percentage {
        p if p >= 90.0 => 'A',
        p if p >= 80.0 => 'B',
        p if p >= 70.0 => 'C',
        p if p >= 60.0 => 'D',
        _ => 'F',
    }
}

/// Sort submissions best first. Equal percentages keep their input order.
pub fn rank_submissions(submissions: &mut [SubmissionSummary]) {
    submissions.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
}

/// Mean percentage rounded to two decimals, or 0 for an empty class.
pub fn class_average(submissions: &[SubmissionSummary]) -> f64 {
    ClassStatistics::compute(submissions)
        .map(|stats| round2(stats.average_percentage))
        .unwrap_or(0.0)
}

/// Printed label of an option: `A`..`E`, then the bare index.
pub fn option_label(index: usize) -> String {
    OPTION_LETTERS
        .get(index)
        .map(|letter| (*letter).to_string())
        .unwrap_or_else(|| index.to_string())
}

/// `-` for no answer, otherwise the option labels joined with commas.
pub fn render_answer(answer: &DetectedAnswer) -> String {
    if !answer.is_answered() {
        return "-".to_string();
    }
    answer
        .indices()
        .iter()
        .map(|&i| option_label(i))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render the class report as CSV.
///
/// Rows are ranked by descending percentage, one `Q` column per question
/// (missing answers render as `-`), followed by a blank line and a summary
/// statistics block.
pub fn export_csv(submissions: &[SubmissionSummary], num_questions: usize) -> String {
    let mut ranked = submissions.to_vec();
    rank_submissions(&mut ranked);

    let mut out = String::new();

    let mut header: Vec<String> = [
        "Rank",
        "Name",
        "Score",
        "Total",
        "Percentage",
        "Grade",
        "Submitted At",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    header.extend((1..=num_questions).map(|q| format!("Q{q}")));
    push_row(&mut out, &header);

    for (i, submission) in ranked.iter().enumerate() {
        let mut row = vec![
            (i + 1).to_string(),
            submission.name.clone(),
            submission.score.to_string(),
            submission.total.to_string(),
            format!("{}%", submission.percentage),
            letter_grade(submission.percentage).to_string(),
            submission.submitted_at.format("%Y-%m-%d %H:%M").to_string(),
        ];
        row.extend((0..num_questions).map(|q| {
            submission
                .answers
                .get(q)
                .map(render_answer)
                .unwrap_or_else(|| "-".to_string())
        }));
        push_row(&mut out, &row);
    }

    // -- Summary block ---------------------------------------------------------

    out.push('\n');
    push_row(&mut out, &["SUMMARY STATISTICS".to_string()]);
    push_row(
        &mut out,
        &["Total Submissions".to_string(), ranked.len().to_string()],
    );

    if let Some(stats) = ClassStatistics::compute(&ranked) {
        push_row(
            &mut out,
            &[
                "Average Score".to_string(),
                format!("{:.2}/{}", stats.average_score, num_questions),
            ],
        );
        push_row(
            &mut out,
            &[
                "Average Percentage".to_string(),
                format!("{:.2}%", stats.average_percentage),
            ],
        );
        push_row(
            &mut out,
            &["Highest Score".to_string(), stats.highest_score.to_string()],
        );
        push_row(
            &mut out,
            &["Lowest Score".to_string(), stats.lowest_score.to_string()],
        );
        push_row(
            &mut out,
            &[
                "Pass Rate (>=60%)".to_string(),
                format!(
                    "{}/{} ({:.1}%)",
                    stats.passed,
                    stats.submissions,
                    stats.pass_rate()
                ),
            ],
        );
    }

    out
}

fn push_row(out: &mut String, fields: &[String]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Quote a field when it contains a separator, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
