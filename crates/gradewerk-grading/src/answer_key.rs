// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer keys - the correct answer and grading mode for every question,
// parsed leniently from the JSON shapes test authoring tools produce.

use gradewerk_core::error::{GradewerkError, Result};
use gradewerk_core::types::{CorrectAnswer, DetectedAnswer, GradingMode, GradingResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::grade_submission;

/// Key entry for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEntry {
    #[serde(rename = "correct_answer")]
    pub correct: CorrectAnswer,
    #[serde(default)]
    pub grading_mode: GradingMode,
}

/// The full answer key of a test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub questions: Vec<KeyEntry>,
}

impl AnswerKey {
    /// Every question graded all-or-nothing.
    pub fn from_answers(answers: Vec<CorrectAnswer>) -> Self {
        Self {
            questions: answers
                .into_iter()
                .map(|correct| KeyEntry {
                    correct,
                    grading_mode: GradingMode::AllOrNothing,
                })
                .collect(),
        }
    }

    /// Parse a key from JSON.
    ///
    /// Accepted shapes:
    /// - `{"questions": [ ... ]}` or a bare array of question objects, each
    ///   `{"correct_answer": ..., "grading_mode": ...}`
    /// - a bare array of answers (`null`, integer, or integer array)
    ///
    /// A question's `correct_answer` may be an integer (integral floats
    /// included), an integer array, or a numeric string; anything else,
    /// `null` included, falls back to option 0. A missing or unknown grading
    /// mode is `AllOrNothing`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("questions") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(GradewerkError::InvalidAnswerKey(
                        "expected a \"questions\" array".into(),
                    ));
                }
            },
            _ => {
                return Err(GradewerkError::InvalidAnswerKey(
                    "expected a JSON array or object".into(),
                ));
            }
        };

        let questions: Vec<KeyEntry> = items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => KeyEntry {
                    correct: parse_correct_answer(i + 1, map.get("correct_answer")),
                    grading_mode: map
                        .get("grading_mode")
                        .and_then(Value::as_str)
                        .map(GradingMode::from_name)
                        .unwrap_or_default(),
                },
                // A null in the bare answer form marks a question with no key.
                Value::Null => KeyEntry {
                    correct: CorrectAnswer::NoAnswer,
                    grading_mode: GradingMode::AllOrNothing,
                },
                other => KeyEntry {
                    correct: parse_correct_answer(i + 1, Some(other)),
                    grading_mode: GradingMode::AllOrNothing,
                },
            })
            .collect();

        debug!(questions = questions.len(), "Answer key parsed");
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn correct_answers(&self) -> Vec<CorrectAnswer> {
        self.questions.iter().map(|q| q.correct.clone()).collect()
    }

    pub fn grading_modes(&self) -> Vec<GradingMode> {
        self.questions.iter().map(|q| q.grading_mode).collect()
    }

    /// Grade detected answers against this key.
    pub fn grade(&self, detected: &[DetectedAnswer]) -> Result<GradingResult> {
        let modes = self.grading_modes();
        grade_submission(detected, &self.correct_answers(), Some(&modes))
    }
}

fn parse_correct_answer(question: usize, value: Option<&Value>) -> CorrectAnswer {
    match value {
        Some(Value::Number(_)) => match value.and_then(option_index) {
            Some(index) => CorrectAnswer::Single(index),
            None => fallback(question, value),
        },
        Some(Value::Array(items)) => {
            let indices: Option<Vec<usize>> = items.iter().map(option_index).collect();
            match indices {
                Some(indices) => CorrectAnswer::from_marks(indices),
                None => fallback(question, value),
            }
        }
        Some(Value::String(s)) => match s.trim().parse::<usize>() {
            Ok(index) => CorrectAnswer::Single(index),
            Err(_) => fallback(question, value),
        },
        _ => fallback(question, value),
    }
}

/// Non-negative integer, including integral floats such as `2.0`.
fn option_index(value: &Value) -> Option<usize> {
    if let Some(index) = value.as_u64() {
        return usize::try_from(index).ok();
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}

fn fallback(question: usize, value: Option<&Value>) -> CorrectAnswer {
    warn!(question, value = ?value, "Unreadable correct answer, using option 0");
    CorrectAnswer::Single(0)
}
