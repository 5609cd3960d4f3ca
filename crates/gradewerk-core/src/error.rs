// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Gradewerk.

use thiserror::Error;

/// Top-level error type for all Gradewerk operations.
#[derive(Debug, Error)]
pub enum GradewerkError {
    // -- Recognition errors --
    #[error("could not read image file: {0}")]
    ImageRead(String),

    #[error("could not find answer sheet rectangle in image")]
    SheetNotFound,

    #[error("error processing image: {0}")]
    Processing(String),

    // -- Input validation --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid answer key: {0}")]
    InvalidAnswerKey(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`GradewerkError`], for callers that branch on
/// the failure without matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ImageRead,
    SheetNotFound,
    Processing,
    InvalidInput,
    Storage,
}

impl GradewerkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ImageRead(_) => ErrorKind::ImageRead,
            Self::SheetNotFound => ErrorKind::SheetNotFound,
            Self::Processing(_) => ErrorKind::Processing,
            Self::InvalidConfig(_) | Self::InvalidAnswerKey(_) => ErrorKind::InvalidInput,
            Self::Database(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Storage,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GradewerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognition_messages_match_report_wording() {
        assert_eq!(
            GradewerkError::SheetNotFound.to_string(),
            "could not find answer sheet rectangle in image"
        );
        assert!(
            GradewerkError::ImageRead("truncated".into())
                .to_string()
                .starts_with("could not read image file")
        );
    }

    #[test]
    fn kind_groups_validation_errors() {
        assert_eq!(
            GradewerkError::InvalidConfig("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            GradewerkError::InvalidAnswerKey("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(GradewerkError::SheetNotFound.kind(), ErrorKind::SheetNotFound);
    }
}
