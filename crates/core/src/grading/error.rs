//! Grading error types.

use thiserror::Error;

use super::columns::GradeField;
use crate::access::PermissionError;

/// Failure to read an uploaded file as a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// The bytes are not a readable CSV or workbook.
    #[error("Could not read the uploaded file: {0}")]
    Unreadable(String),

    /// The file has no header row.
    #[error("The uploaded file is empty.")]
    Empty,
}

/// Store failure surfaced by a [`GradeStore`](super::GradeStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Uniqueness conflict on a single record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// The backend's own description, without the variant prefix.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Conflict(detail) | Self::Backend(detail) => detail,
        }
    }
}

/// Errors that stop an ingestion run before or while it writes.
///
/// Row-level problems are not errors here; they are collected in
/// [`IngestResult::errors`](super::IngestResult).
#[derive(Debug, Error)]
pub enum IngestError {
    /// Caller may not upload grades for this course.
    #[error(transparent)]
    Permission(#[from] PermissionError),

    /// Required columns are absent.
    #[error("Missing required column(s): {}", labels(.missing))]
    MissingColumns {
        /// Fields no header matched.
        missing: Vec<GradeField>,
    },

    /// The file could not be parsed.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// Semester or academic year label is invalid.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// A manually entered grade failed validation.
    #[error("{0}")]
    InvalidEntry(String),

    /// The store failed while saving a manually entered grade.
    #[error("Could not save grades: {0}")]
    Store(StoreError),
}

fn labels(fields: &[GradeField]) -> String {
    fields
        .iter()
        .map(GradeField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

impl IngestError {
    /// Returns true for errors caused by the uploaded file itself.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::MissingColumns { .. } | Self::Sheet(_))
    }
}
