//! Grading domain types.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use edupace_shared::types::{CourseId, StudentId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Letter grade scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    /// A+
    #[serde(rename = "A+")]
    APlus,
    /// A
    #[serde(rename = "A")]
    A,
    /// A-
    #[serde(rename = "A-")]
    AMinus,
    /// B+
    #[serde(rename = "B+")]
    BPlus,
    /// B
    #[serde(rename = "B")]
    B,
    /// B-
    #[serde(rename = "B-")]
    BMinus,
    /// C+
    #[serde(rename = "C+")]
    CPlus,
    /// C
    #[serde(rename = "C")]
    C,
    /// C-
    #[serde(rename = "C-")]
    CMinus,
    /// D
    #[serde(rename = "D")]
    D,
    /// F
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// Every grade, best first.
    pub const ALL: [Self; 11] = [
        Self::APlus,
        Self::A,
        Self::AMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CPlus,
        Self::C,
        Self::CMinus,
        Self::D,
        Self::F,
    ];

    /// Canonical text form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for text that is not on the grade scale.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid grade \"{0}\"")]
pub struct InvalidGrade(pub String);

impl FromStr for LetterGrade {
    type Err = InvalidGrade;

    /// Accepts surrounding whitespace and lowercase input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or(InvalidGrade(normalized))
    }
}

/// Why a percentage cell was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PercentageError {
    /// Not a number.
    #[error("Invalid percentage \"{0}\"")]
    Malformed(String),
    /// Outside 0 to 100.
    #[error("Percentage {0} is outside 0-100")]
    OutOfRange(Decimal),
}

/// Parses an optional percentage cell.
///
/// Blank input is `Ok(None)`. Accepted values are rounded to two decimal places.
///
/// # Errors
///
/// Returns `PercentageError` for malformed or out-of-range values.
pub fn parse_percentage(raw: &str) -> Result<Option<Decimal>, PercentageError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| PercentageError::Malformed(trimmed.to_string()))?;

    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(PercentageError::OutOfRange(value));
    }

    Ok(Some(value.round_dp(2)))
}

/// Where an ingestion run writes: course plus term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestTarget {
    /// Course receiving the grades.
    pub course_id: CourseId,
    /// Free-text semester label; may be empty.
    pub semester: String,
    /// Free-text academic year label; may be empty.
    pub academic_year: String,
    /// Account performing the upload.
    pub actor: UserId,
}

/// Natural key of a grade record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradeKey {
    /// Student profile.
    pub student_id: StudentId,
    /// Course.
    pub course_id: CourseId,
    /// Semester label.
    pub semester: String,
    /// Academic year label.
    pub academic_year: String,
}

/// Values written by one upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeUpsert {
    /// Record key.
    pub key: GradeKey,
    /// Letter grade.
    pub grade: LetterGrade,
    /// Optional percentage, already validated.
    pub percentage: Option<Decimal>,
    /// Account that wrote the values.
    pub created_by: UserId,
}

/// Whether an upsert inserted or overwrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was inserted.
    Created,
    /// An existing record was overwritten.
    Updated,
}

/// Reason one row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowErrorKind {
    /// The student ID cell is blank.
    MissingStudentId,
    /// No student profile carries this identifier.
    StudentNotFound,
    /// The grade cell is not on the scale.
    InvalidGrade(String),
    /// The percentage cell is not a number.
    InvalidPercentage(String),
    /// The percentage is outside 0 to 100.
    PercentageOutOfRange(Decimal),
    /// The store reported a uniqueness conflict.
    Conflict(String),
    /// The store failed while saving this row.
    StoreFailure(String),
}

/// A rejected row. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Spreadsheet row number; the header is row 1.
    pub row: u32,
    /// Trimmed student identifier, when the cell had one.
    pub student_id: Option<String>,
    /// What went wrong.
    pub kind: RowErrorKind,
}

impl RowError {
    /// Message without the row suffix.
    #[must_use]
    pub fn message(&self) -> String {
        let student = self.student_id.as_deref().unwrap_or_default();
        match &self.kind {
            RowErrorKind::MissingStudentId => "Missing student ID".to_string(),
            RowErrorKind::StudentNotFound => format!("Student with ID {student} not found"),
            RowErrorKind::InvalidGrade(g) => {
                format!("Invalid grade \"{g}\" for student {student}")
            }
            RowErrorKind::InvalidPercentage(p) => {
                format!("Invalid percentage \"{p}\" for student {student}")
            }
            RowErrorKind::PercentageOutOfRange(p) => {
                format!("Percentage {p} is outside 0-100 for student {student}")
            }
            RowErrorKind::Conflict(detail) | RowErrorKind::StoreFailure(detail) => {
                format!("Could not save grade for student {student}: {detail}")
            }
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (row {})", self.message(), self.row)
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestResult {
    /// Records inserted.
    pub created: u32,
    /// Records overwritten.
    pub updated: u32,
    /// Rejected rows in sheet order.
    pub errors: Vec<RowError>,
}

impl IngestResult {
    /// One-line summary for the uploader.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut message = format!(
            "Created {} grade(s), updated {} grade(s).",
            self.created, self.updated
        );
        if !self.errors.is_empty() {
            let _ = write!(message, " {} error(s) occurred.", self.errors.len());
        }
        message
    }

    pub(crate) fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }
}
