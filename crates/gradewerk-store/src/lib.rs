// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gradewerk-store - Persistence for graded answer sheets.
//
// Keeps graded submissions in a local SQLite database, keyed by test, and
// fingerprints submitted scans with SHA-256 so re-uploads can be spotted.

pub mod integrity;
pub mod submissions;

pub use integrity::{hash_bytes, hash_file};
pub use submissions::{StoredSubmission, SubmissionId, SubmissionStore};
