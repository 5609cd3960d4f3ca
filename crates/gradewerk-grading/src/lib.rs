// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gradewerk-grading - Scoring of detected answers against an answer key.
//
// Normalizes every answer shape to a set of option indices, scores each
// question under its grading mode (all-or-nothing or partial credit), parses
// answer keys, and renders class reports. Independent of the imaging stack.

pub mod answer_key;
pub mod engine;
pub mod normalize;
pub mod report;

pub use answer_key::{AnswerKey, KeyEntry};
pub use engine::{grade_question, grade_submission, percentage, question_points};
pub use normalize::normalize;
pub use report::{
    ClassStatistics, SubmissionSummary, class_average, export_csv, letter_grade, option_label,
    rank_submissions, render_answer,
};
