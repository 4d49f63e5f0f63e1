//! Decode report: the defaults the reader had to apply.
//!
//! Optional object fields that are present but unreadable do not fail a
//! decode. Each such fallback is recorded here so callers can surface it,
//! the same way a conversion report surfaces lossy steps.

use serde::Serialize;
use std::fmt;

/// What kind of fallback happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DecodeIssueCode {
    /// `<angle>` was not an integer; 0 was used.
    UnparsableAngle,
    /// `<tetragon>` or `<shape3D>` was not a recognized boolean; false was used.
    UnrecognizedKindFlag,
    /// `<difficult>` was not a recognized boolean; false was used.
    UnrecognizedDifficult,
}

/// One applied default, tied to the object it happened on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecodeIssue {
    pub code: DecodeIssueCode,
    /// Zero-based index of the `<object>` element.
    pub object_index: usize,
    pub message: String,
}

impl fmt::Display for DecodeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {}: {}", self.object_index, self.message)
    }
}

/// Everything the reader smoothed over while decoding one document.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DecodeReport {
    pub issues: Vec<DecodeIssue>,
}

impl DecodeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue and logs it as a warning.
    pub fn warn(&mut self, code: DecodeIssueCode, object_index: usize, message: impl Into<String>) {
        let issue = DecodeIssue {
            code,
            object_index,
            message: message.into(),
        };
        log::warn!("{}", issue);
        self.issues.push(issue);
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, code: DecodeIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }
}

impl fmt::Display for DecodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return Ok(());
        }
        writeln!(f, "Warnings ({}):", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  - {}", issue)?;
        }
        Ok(())
    }
}
