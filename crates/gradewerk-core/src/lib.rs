// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gradewerk - Core types, configuration and error definitions shared across
// the recognition, grading and storage crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{AppConfig, OmrConfig};
pub use error::{ErrorKind, GradewerkError};
pub use types::*;
