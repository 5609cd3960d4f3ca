// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Gradewerk answer-sheet grader.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GradewerkError, Result};

/// Default fraction of a bubble that must be inked for it to count as marked.
pub const DEFAULT_DARKNESS_THRESHOLD: f64 = 0.6;

/// Shape of the bubble grid printed on the answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of question rows (at least 1).
    pub num_questions: usize,
    /// Number of option columns per question (at least 2).
    pub num_options: usize,
    /// Minimum foreground fraction of a cell, in (0, 1].
    pub darkness_threshold: f64,
}

impl GridConfig {
    /// Build a validated grid configuration.
    pub fn new(num_questions: usize, num_options: usize, darkness_threshold: f64) -> Result<Self> {
        let grid = Self {
            num_questions,
            num_options,
            darkness_threshold,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check the invariants. Deserialized configs bypass [`GridConfig::new`],
    /// so the pipeline calls this again before sampling.
    pub fn validate(&self) -> Result<()> {
        if self.num_questions < 1 {
            return Err(GradewerkError::InvalidConfig(
                "num_questions must be at least 1".into(),
            ));
        }
        if self.num_options < 2 {
            return Err(GradewerkError::InvalidConfig(format!(
                "num_options must be at least 2, got {}",
                self.num_options
            )));
        }
        if !(self.darkness_threshold > 0.0 && self.darkness_threshold <= 1.0) {
            return Err(GradewerkError::InvalidConfig(format!(
                "darkness_threshold must be in (0, 1], got {}",
                self.darkness_threshold
            )));
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            num_questions: 20,
            num_options: 5,
            darkness_threshold: DEFAULT_DARKNESS_THRESHOLD,
        }
    }
}

/// The marks recorded for one question: nothing, one option, or several.
///
/// Used both for what the scanner detected and for the answer key. On the wire
/// this is `null`, an integer, or an ascending integer array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Answer {
    #[default]
    NoAnswer,
    Single(usize),
    /// Two or more option indices, ascending and without duplicates.
    Multiple(Vec<usize>),
}

/// What the mark detector found for a question.
pub type DetectedAnswer = Answer;

/// The answer key entry for a question.
pub type CorrectAnswer = Answer;

impl Answer {
    /// Build the canonical variant for a set of marked option indices.
    ///
    /// Indices are sorted and deduplicated; an empty list is `NoAnswer` and a
    /// single index is `Single`.
    pub fn from_marks(mut marks: Vec<usize>) -> Self {
        marks.sort_unstable();
        marks.dedup();
        match marks.len() {
            0 => Self::NoAnswer,
            1 => Self::Single(marks[0]),
            _ => Self::Multiple(marks),
        }
    }

    /// Marked option indices in ascending order.
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::NoAnswer => &[],
            Self::Single(index) => std::slice::from_ref(index),
            Self::Multiple(indices) => indices,
        }
    }

    pub fn is_answered(&self) -> bool {
        !matches!(self, Self::NoAnswer)
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::NoAnswer => serializer.serialize_none(),
            Self::Single(index) => serializer.serialize_u64(*index as u64),
            Self::Multiple(indices) => indices.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            One(usize),
            Many(Vec<usize>),
        }

        Ok(match Option::<Wire>::deserialize(deserializer)? {
            None => Self::NoAnswer,
            Some(Wire::One(index)) => Self::Single(index),
            Some(Wire::Many(indices)) => Self::from_marks(indices),
        })
    }
}

/// Scoring policy for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GradingMode {
    /// Full credit only for an exact match of the marked set.
    #[default]
    AllOrNothing,
    /// Proportional credit, with extraneous marks subtracting.
    PartialCredit,
}

impl GradingMode {
    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllOrNothing => "all_or_nothing",
            Self::PartialCredit => "partial_credit",
        }
    }

    /// Parse a mode name. Anything unrecognised is `AllOrNothing`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "partial_credit" => Self::PartialCredit,
            _ => Self::AllOrNothing,
        }
    }
}

impl std::fmt::Display for GradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GradingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GradingMode {
    /// Never fails on a well-formed value: unknown names, numbers and `null`
    /// all degrade to `AllOrNothing`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::from_name).unwrap_or_default())
    }
}

/// Per-question outcome of grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingDetail {
    /// 1-based question number.
    #[serde(rename = "question")]
    pub question_number: usize,
    pub detected: DetectedAnswer,
    pub correct: CorrectAnswer,
    /// True iff the question earned full credit.
    #[serde(rename = "is_correct")]
    pub is_exact_match: bool,
    /// Credit in [0, 1].
    pub points: f64,
    pub grading_mode: GradingMode,
}

/// Aggregate score of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub score: f64,
    pub total: usize,
    /// `score / total * 100`, rounded to two decimals; 0 when `total` is 0.
    pub percentage: f64,
    pub details: Vec<GradingDetail>,
}

/// Outcome of a recognition call in its external shape:
/// `{success, answers, error}`, never carrying partial answers on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionReport {
    pub success: bool,
    pub answers: Option<Vec<DetectedAnswer>>,
    pub error: Option<String>,
}

impl RecognitionReport {
    pub fn from_result(result: &Result<Vec<DetectedAnswer>>) -> Self {
        match result {
            Ok(answers) => Self {
                success: true,
                answers: Some(answers.clone()),
                error: None,
            },
            Err(err) => Self {
                success: false,
                answers: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_config_rejects_out_of_range_values() {
        assert!(GridConfig::new(0, 5, 0.6).is_err());
        assert!(GridConfig::new(20, 1, 0.6).is_err());
        assert!(GridConfig::new(20, 5, 0.0).is_err());
        assert!(GridConfig::new(20, 5, 1.5).is_err());
        assert!(GridConfig::new(20, 5, f64::NAN).is_err());
        assert!(GridConfig::new(1, 2, 1.0).is_ok());
    }

    #[test]
    fn from_marks_canonicalizes() {
        assert_eq!(Answer::from_marks(vec![]), Answer::NoAnswer);
        assert_eq!(Answer::from_marks(vec![3]), Answer::Single(3));
        assert_eq!(Answer::from_marks(vec![4, 1, 4]), Answer::Multiple(vec![1, 4]));
        assert_eq!(Answer::from_marks(vec![2, 2]), Answer::Single(2));
    }

    #[test]
    fn answer_wire_format() {
        let answers = vec![
            Answer::NoAnswer,
            Answer::Single(2),
            Answer::Multiple(vec![0, 3]),
        ];
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, "[null,2,[0,3]]");

        let parsed: Vec<Answer> = serde_json::from_str("[null, 1, [3, 0], [4], []]").unwrap();
        assert_eq!(
            parsed,
            vec![
                Answer::NoAnswer,
                Answer::Single(1),
                Answer::Multiple(vec![0, 3]),
                Answer::Single(4),
                Answer::NoAnswer,
            ]
        );
    }

    #[test]
    fn unknown_grading_mode_degrades_to_all_or_nothing() {
        let modes: Vec<GradingMode> =
            serde_json::from_str(r#"["partial_credit", "all_or_nothing", "bonus", null, 7]"#)
                .unwrap();
        assert_eq!(
            modes,
            vec![
                GradingMode::PartialCredit,
                GradingMode::AllOrNothing,
                GradingMode::AllOrNothing,
                GradingMode::AllOrNothing,
                GradingMode::AllOrNothing,
            ]
        );
    }

    #[test]
    fn detail_uses_external_field_names() {
        let detail = GradingDetail {
            question_number: 1,
            detected: Answer::Single(0),
            correct: Answer::Single(0),
            is_exact_match: true,
            points: 1.0,
            grading_mode: GradingMode::AllOrNothing,
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["question"], 1);
        assert_eq!(value["is_correct"], true);
        assert_eq!(value["grading_mode"], "all_or_nothing");
    }

    #[test]
    fn failed_report_carries_no_answers() {
        let report = RecognitionReport::from_result(&Err(GradewerkError::SheetNotFound));
        assert!(!report.success);
        assert!(report.answers.is_none());
        assert_eq!(
            report.error.as_deref(),
            Some("could not find answer sheet rectangle in image")
        );
    }
}
