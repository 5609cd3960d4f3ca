// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the people operating the scanner.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity tells the caller whether a fresh scan of the same sheet is likely
// to help; the core itself never retries.

use crate::error::GradewerkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A better photo of the same sheet will probably work.
    Rescan,
    /// The operator must change an input (answer key, settings, path).
    Fixable,
    /// Something is wrong with the installation or storage.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether re-scanning or re-uploading is worth trying.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `GradewerkError` into a `HumanError`.
pub fn humanize_error(err: &GradewerkError) -> HumanError {
    match err {
        GradewerkError::ImageRead(_) => HumanError {
            message: "We couldn't open this image.".into(),
            suggestion: "The file may be damaged or not a picture. Save the scan as JPEG or PNG and upload it again.".into(),
            retriable: true,
            severity: Severity::Rescan,
        },

        GradewerkError::SheetNotFound => HumanError {
            message: "We couldn't find the answer sheet in this photo.".into(),
            suggestion: "Photograph the whole sheet on a dark, plain surface so all four corners are visible, then try again.".into(),
            retriable: true,
            severity: Severity::Rescan,
        },

        GradewerkError::Processing(detail) => HumanError {
            message: "Something went wrong while reading the marks.".into(),
            suggestion: format!("Try a straighter, better lit photo of the sheet. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Rescan,
        },

        GradewerkError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings aren't valid.".into(),
            suggestion: format!("Check the number of questions, options and the darkness setting. ({detail})"),
            retriable: false,
            severity: Severity::Fixable,
        },

        GradewerkError::InvalidAnswerKey(detail) => HumanError {
            message: "The answer key doesn't look right.".into(),
            suggestion: format!("Make sure every question has a correct answer and a grading mode. ({detail})"),
            retriable: false,
            severity: Severity::Fixable,
        },

        GradewerkError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => HumanError {
            message: "A file we needed is missing.".into(),
            suggestion: "Check the file path and try again.".into(),
            retriable: false,
            severity: Severity::Fixable,
        },

        GradewerkError::Database(_) | GradewerkError::Io(_) => HumanError {
            message: "We couldn't save or load results.".into(),
            suggestion: "Check that the results database is on a writable disk with free space.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        GradewerkError::Serialization(_) => HumanError {
            message: "A settings or answer file couldn't be read.".into(),
            suggestion: "The file should be valid JSON. Open it in a text editor to check for typos.".into(),
            retriable: false,
            severity: Severity::Fixable,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_not_found_suggests_rescan() {
        let human = humanize_error(&GradewerkError::SheetNotFound);
        assert_eq!(human.severity, Severity::Rescan);
        assert!(human.retriable);
    }

    #[test]
    fn bad_answer_key_is_fixable() {
        let human = humanize_error(&GradewerkError::InvalidAnswerKey("3 modes for 4 questions".into()));
        assert_eq!(human.severity, Severity::Fixable);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("3 modes for 4 questions"));
    }

    #[test]
    fn missing_file_is_fixable() {
        let err = GradewerkError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::Fixable);
    }

    #[test]
    fn database_failure_is_permanent() {
        let human = humanize_error(&GradewerkError::Database("disk I/O error".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
