//! Report error types.

use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// There is nothing to report.
    #[error("No grades found for this course.")]
    EmptyDataset,

    /// The PDF backend failed.
    #[error("Failed to render PDF: {0}")]
    Pdf(String),

    /// The CSV writer failed.
    #[error("Failed to render CSV: {0}")]
    Csv(#[from] csv::Error),
}
