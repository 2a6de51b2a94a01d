//! Report data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::grading::LetterGrade;

/// Title printed on every grade report.
pub const GRADE_REPORT_TITLE: &str = "Grade Report";

/// Fixed column headers of a grade report.
pub const GRADE_REPORT_COLUMNS: [&str; 6] = [
    "Student ID",
    "Student Name",
    "Grade",
    "Percentage",
    "Semester",
    "Academic Year",
];

/// Course identity shown in a report heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCourse {
    /// Course code, e.g. `CS101`.
    pub code: String,
    /// Course name.
    pub name: String,
}

/// One grade as it appears in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReportRow {
    /// External student identifier.
    pub student_identifier: String,
    /// Full name, already falling back to the login handle.
    pub student_name: String,
    /// Letter grade.
    pub grade: LetterGrade,
    /// Optional percentage.
    pub percentage: Option<Decimal>,
    /// Semester label.
    pub semester: String,
    /// Academic year label.
    pub academic_year: String,
}

impl GradeReportRow {
    /// Cell text in column order.
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.student_identifier.clone(),
            self.student_name.clone(),
            self.grade.to_string(),
            self.percentage.map(|p| p.to_string()).unwrap_or_default(),
            self.semester.clone(),
            self.academic_year.clone(),
        ]
    }
}

/// A titled table, ready for any renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularDocument {
    /// Document title.
    pub title: String,
    /// Line under the title.
    pub subtitle: String,
    /// Column headers.
    pub headers: Vec<String>,
    /// Body rows; each has one cell per header.
    pub rows: Vec<Vec<String>>,
}
