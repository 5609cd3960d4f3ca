// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graded submissions backed by SQLite.
//
// Only the outcome of grading is stored (detected answers, score, and the
// fingerprint of the scanned image), never the image itself.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use gradewerk_core::error::{GradewerkError, Result};
use gradewerk_core::types::{DetectedAnswer, GradingResult};

/// SQLite schema for the submissions table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS submissions (
        id TEXT PRIMARY KEY,
        test_id TEXT NOT NULL,
        source_name TEXT NOT NULL,
        image_hash TEXT,
        answers TEXT NOT NULL,
        score REAL NOT NULL,
        total INTEGER NOT NULL,
        percentage REAL NOT NULL,
        submitted_at TEXT NOT NULL,
        student_name TEXT
    );
    CREATE INDEX IF NOT EXISTS submissions_test ON submissions (test_id);
    CREATE INDEX IF NOT EXISTS submissions_hash ON submissions (image_hash);
"#;

const SELECT_COLUMNS: &str = "SELECT id, test_id, source_name, image_hash, answers, score, total,
        percentage, submitted_at, student_name
 FROM submissions";

/// Unique identifier of a stored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One graded answer sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: SubmissionId,
    pub test_id: String,
    /// File name (or other label) the sheet was submitted under.
    pub source_name: String,
    /// SHA-256 hex digest of the scanned image, when there was one.
    pub image_hash: Option<String>,
    pub answers: Vec<DetectedAnswer>,
    pub score: f64,
    pub total: usize,
    pub percentage: f64,
    pub submitted_at: DateTime<Utc>,
    pub student_name: Option<String>,
}

impl StoredSubmission {
    /// A fresh submission stamped with a new id and the current time.
    pub fn new(
        test_id: impl Into<String>,
        source_name: impl Into<String>,
        image_hash: Option<String>,
        answers: Vec<DetectedAnswer>,
        result: &GradingResult,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            test_id: test_id.into(),
            source_name: source_name.into(),
            image_hash,
            answers,
            score: result.score,
            total: result.total,
            percentage: result.percentage,
            submitted_at: Utc::now(),
            student_name: None,
        }
    }

    /// Student name if one was recorded, otherwise the source name.
    pub fn display_name(&self) -> &str {
        self.student_name.as_deref().unwrap_or(&self.source_name)
    }
}

/// Persistent store of graded submissions.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively.  In an async context, wrap calls in `tokio::task::spawn_blocking`.
pub struct SubmissionStore {
    conn: Connection,
}

impl SubmissionStore {
    /// Open (or create) the submissions database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| GradewerkError::Database(format!("open: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| GradewerkError::Database(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| GradewerkError::Database(format!("create table: {e}")))?;

        info!("submission database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| GradewerkError::Database(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| GradewerkError::Database(format!("create table: {e}")))?;

        debug!("in-memory submission database opened");
        Ok(Self { conn })
    }

    #[instrument(skip(self, submission), fields(id = %submission.id, test_id = %submission.test_id))]
    pub fn insert(&self, submission: &StoredSubmission) -> Result<()> {
        let answers_json = serde_json::to_string(&submission.answers)?;
        let total = i64::try_from(submission.total)
            .map_err(|_| GradewerkError::Database("total out of range".into()))?;

        self.conn
            .execute(
                "INSERT INTO submissions (id, test_id, source_name, image_hash, answers,
                 score, total, percentage, submitted_at, student_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    submission.id.to_string(),
                    submission.test_id,
                    submission.source_name,
                    submission.image_hash,
                    answers_json,
                    submission.score,
                    total,
                    submission.percentage,
                    submission.submitted_at.to_rfc3339(),
                    submission.student_name,
                ],
            )
            .map_err(|e| GradewerkError::Database(format!("insert submission: {e}")))?;

        info!(percentage = submission.percentage, "submission stored");
        Ok(())
    }

    /// Returns `None` if the submission does not exist.
    #[instrument(skip(self), fields(id = %id))]
    pub fn get(&self, id: &SubmissionId) -> Result<Option<StoredSubmission>> {
        self.conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                row_to_submission,
            )
            .optional()
            .map_err(|e| GradewerkError::Database(format!("get submission: {e}")))
    }

    /// All submissions for a test, best first. Equal percentages are ordered
    /// by submission time.
    #[instrument(skip(self))]
    pub fn list_for_test(&self, test_id: &str) -> Result<Vec<StoredSubmission>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE test_id = ?1 ORDER BY percentage DESC, submitted_at ASC"
            ))
            .map_err(|e| GradewerkError::Database(format!("prepare list_for_test: {e}")))?;

        let submissions = stmt
            .query_map(params![test_id], row_to_submission)
            .map_err(|e| GradewerkError::Database(format!("query list_for_test: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GradewerkError::Database(format!("collect rows: {e}")))?;

        debug!(count = submissions.len(), "retrieved submissions");
        Ok(submissions)
    }

    /// Submissions whose scanned image has the given fingerprint.
    #[instrument(skip(self))]
    pub fn find_by_hash(&self, image_hash: &str) -> Result<Vec<StoredSubmission>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE image_hash = ?1 ORDER BY submitted_at ASC"
            ))
            .map_err(|e| GradewerkError::Database(format!("prepare find_by_hash: {e}")))?;

        let submissions = stmt
            .query_map(params![image_hash], row_to_submission)
            .map_err(|e| GradewerkError::Database(format!("query find_by_hash: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GradewerkError::Database(format!("collect rows: {e}")))?;

        debug!(count = submissions.len(), "matched image hash");
        Ok(submissions)
    }

    /// Attach a student name to a submission.
    #[instrument(skip(self), fields(id = %id))]
    pub fn rename_student(&self, id: &SubmissionId, student_name: &str) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE submissions SET student_name = ?1 WHERE id = ?2",
                params![student_name, id.to_string()],
            )
            .map_err(|e| GradewerkError::Database(format!("rename student: {e}")))?;

        if rows == 0 {
            return Err(GradewerkError::Database(format!("submission {id} not found")));
        }

        debug!("student name updated");
        Ok(())
    }

    /// Number of submissions for a test.
    pub fn count(&self, test_id: &str) -> Result<u64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM submissions WHERE test_id = ?1",
                params![test_id],
                |row| row.get(0),
            )
            .map_err(|e| GradewerkError::Database(format!("count: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

/// Column indices must match `SELECT_COLUMNS`.
fn row_to_submission(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredSubmission> {
    let id_str: String = row.get(0)?;
    let answers_json: String = row.get(4)?;
    let total: i64 = row.get(6)?;
    let submitted_at_str: String = row.get(8)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| conversion_error(0, e))?;
    let total = usize::try_from(total).map_err(|e| conversion_error(6, e))?;
    let answers: Vec<DetectedAnswer> =
        serde_json::from_str(&answers_json).map_err(|e| conversion_error(4, e))?;
    let submitted_at = DateTime::parse_from_rfc3339(&submitted_at_str)
        .map_err(|e| conversion_error(8, e))?
        .with_timezone(&Utc);

    Ok(StoredSubmission {
        id: SubmissionId(id),
        test_id: row.get(1)?,
        source_name: row.get(2)?,
        image_hash: row.get(3)?,
        answers,
        score: row.get(5)?,
        total,
        percentage: row.get(7)?,
        submitted_at,
        student_name: row.get(9)?,
    })
}
