// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grading engine - score detected answers against the key, question by
// question, under each question's grading mode.

use std::collections::BTreeSet;

use gradewerk_core::error::{GradewerkError, Result};
use gradewerk_core::types::{
    CorrectAnswer, DetectedAnswer, GradingDetail, GradingMode, GradingResult,
};
use tracing::{debug, instrument};

use crate::normalize::normalize;

/// Points earned by one question, in [0, 1].
///
/// - nothing marked scores 0 under every mode
/// - an empty key entry scores 0
/// - `AllOrNothing`: 1 for an exact set match, otherwise 0
/// - `PartialCredit`: `(|D ∩ C| - |D \ C|) / |C|`, clamped to [0, 1]
pub fn question_points(detected: &BTreeSet<usize>, correct: &BTreeSet<usize>, mode: GradingMode) -> f64 {
    if detected.is_empty() || correct.is_empty() {
        return 0.0;
    }

    match mode {
        GradingMode::AllOrNothing => {
            if detected == correct {
                1.0
            } else {
                0.0
            }
        }
        GradingMode::PartialCredit => {
            let hits = detected.intersection(correct).count() as f64;
            let extras = detected.difference(correct).count() as f64;
            ((hits - extras) / correct.len() as f64).clamp(0.0, 1.0)
        }
    }
}

/// Grade one question. `question_number` is 1-based.
pub fn grade_question(
    question_number: usize,
    detected: &DetectedAnswer,
    correct: &CorrectAnswer,
    mode: GradingMode,
) -> GradingDetail {
    let points = question_points(&normalize(detected), &normalize(correct), mode);
    GradingDetail {
        question_number,
        detected: detected.clone(),
        correct: correct.clone(),
        is_exact_match: points == 1.0,
        points,
        grading_mode: mode,
    }
}

/// `score / total * 100` rounded to two decimals, or 0 for an empty test.
pub fn percentage(score: f64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(score / total as f64 * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Grade a whole submission.
///
/// The key decides the question count: questions the scanner returned no
/// entry for count as unanswered, and detected entries beyond the key are
/// ignored. Without `modes` every question is `AllOrNothing`; with them, the
/// list must be as long as the key.
#[instrument(skip_all, fields(questions = correct.len()))]
pub fn grade_submission(
    detected: &[DetectedAnswer],
    correct: &[CorrectAnswer],
    modes: Option<&[GradingMode]>,
) -> Result<GradingResult> {
    if let Some(modes) = modes {
        if modes.len() != correct.len() {
            return Err(GradewerkError::InvalidAnswerKey(format!(
                "{} grading modes for {} questions",
                modes.len(),
                correct.len()
            )));
        }
    }

    let unanswered = DetectedAnswer::NoAnswer;
    let details: Vec<GradingDetail> = correct
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let mode = modes.map(|m| m[i]).unwrap_or_default();
            let marks = detected.get(i).unwrap_or(&unanswered);
            grade_question(i + 1, marks, key, mode)
        })
        .collect();

    let score: f64 = details.iter().map(|d| d.points).sum();
    let total = details.len();
    let result = GradingResult {
        score,
        total,
        percentage: percentage(score, total),
        details,
    };
    debug!(score, total, percentage = result.percentage, "Submission graded");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn all_or_nothing_requires_exact_match() {
        let mode = GradingMode::AllOrNothing;
        assert_eq!(question_points(&set(&[1]), &set(&[1]), mode), 1.0);
        assert_eq!(question_points(&set(&[1, 2]), &set(&[1]), mode), 0.0);
        assert_eq!(question_points(&set(&[]), &set(&[1]), mode), 0.0);
        assert_eq!(question_points(&set(&[0]), &set(&[0, 2]), mode), 0.0);
        assert_eq!(question_points(&set(&[2, 0]), &set(&[0, 2]), mode), 1.0);
    }

    #[test]
    fn partial_credit_adds_hits_and_subtracts_extras() {
        let mode = GradingMode::PartialCredit;
        let key = set(&[0, 2]);
        assert_eq!(question_points(&set(&[0]), &key, mode), 0.5);
        assert_eq!(question_points(&set(&[0, 2]), &key, mode), 1.0);
        assert_eq!(question_points(&set(&[0, 1, 2]), &key, mode), 0.5);
        assert_eq!(question_points(&set(&[1]), &key, mode), 0.0);
        assert_eq!(question_points(&set(&[1, 3, 4]), &key, mode), 0.0);
    }

    #[test]
    fn unanswered_scores_zero_under_every_mode() {
        for mode in [GradingMode::AllOrNothing, GradingMode::PartialCredit] {
            let detail = grade_question(1, &DetectedAnswer::NoAnswer, &CorrectAnswer::Single(0), mode);
            assert_eq!(detail.points, 0.0);
            assert!(!detail.is_exact_match);
        }
    }

    #[test]
    fn empty_key_entry_scores_zero() {
        for mode in [GradingMode::AllOrNothing, GradingMode::PartialCredit] {
            assert_eq!(question_points(&set(&[0]), &set(&[]), mode), 0.0);
        }
    }

    #[test]
    fn grades_submission_with_default_modes() {
        let detected = vec![
            DetectedAnswer::Single(1),
            DetectedAnswer::Multiple(vec![0, 2]),
            DetectedAnswer::NoAnswer,
        ];
        let correct = vec![
            CorrectAnswer::Single(1),
            CorrectAnswer::Multiple(vec![0, 2]),
            CorrectAnswer::Single(3),
        ];
        let result = grade_submission(&detected, &correct, None).unwrap();
        assert_eq!(result.score, 2.0);
        assert_eq!(result.total, 3);
        assert_eq!(result.percentage, 66.67);
        assert_eq!(result.details.len(), 3);
        assert_eq!(result.details[0].question_number, 1);
        assert!(result.details[1].is_exact_match);
        assert_eq!(result.details[2].grading_mode, GradingMode::AllOrNothing);
    }

    #[test]
    fn partial_credit_is_not_an_exact_match() {
        let detected = vec![DetectedAnswer::Single(0), DetectedAnswer::Single(0)];
        let correct = vec![CorrectAnswer::Multiple(vec![0, 2]), CorrectAnswer::Multiple(vec![0, 2])];
        let modes = [GradingMode::PartialCredit, GradingMode::AllOrNothing];
        let result = grade_submission(&detected, &correct, Some(&modes)).unwrap();
        assert_eq!(result.details[0].points, 0.5);
        assert!(!result.details[0].is_exact_match);
        assert_eq!(result.details[1].points, 0.0);
        assert_eq!(result.score, 0.5);
        assert_eq!(result.percentage, 25.0);
    }

    #[test]
    fn empty_test_has_zero_percentage() {
        let result = grade_submission(&[], &[], None).unwrap();
        assert_eq!(result.total, 0);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn missing_detected_entries_count_as_unanswered() {
        let correct = vec![CorrectAnswer::Single(0), CorrectAnswer::Single(1)];
        let result = grade_submission(&[DetectedAnswer::Single(0)], &correct, None).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.details[1].detected, DetectedAnswer::NoAnswer);
    }

    #[test]
    fn mode_count_must_match_key() {
        let correct = vec![CorrectAnswer::Single(0), CorrectAnswer::Single(1)];
        let err = grade_submission(&[], &correct, Some(&[GradingMode::PartialCredit])).unwrap_err();
        assert!(matches!(err, GradewerkError::InvalidAnswerKey(_)));
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(1.0, 3), 33.33);
        assert_eq!(percentage(2.5, 3), 83.33);
        assert_eq!(percentage(7.0, 7), 100.0);
        assert_eq!(percentage(0.0, 0), 0.0);
    }
}
