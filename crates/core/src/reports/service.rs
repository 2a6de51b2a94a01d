//! Report generation service.

use super::error::ReportError;
use super::types::{
    GRADE_REPORT_COLUMNS, GRADE_REPORT_TITLE, GradeReportRow, ReportCourse, TabularDocument,
};

/// Service for generating course reports.
pub struct ReportService;

impl ReportService {
    /// Builds the grade table for a course.
    ///
    /// Rows keep the order they were given in.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::EmptyDataset` when `rows` is empty.
    pub fn build_grade_report(
        course: &ReportCourse,
        rows: &[GradeReportRow],
    ) -> Result<TabularDocument, ReportError> {
        if rows.is_empty() {
            return Err(ReportError::EmptyDataset);
        }

        Ok(TabularDocument {
            title: GRADE_REPORT_TITLE.to_string(),
            subtitle: format!("{} - {}", course.code, course.name),
            headers: GRADE_REPORT_COLUMNS.iter().map(ToString::to_string).collect(),
            rows: rows.iter().map(GradeReportRow::cells).collect(),
        })
    }

    /// Download filename for a course report, e.g. `CS101_grades.pdf`.
    #[must_use]
    pub fn report_filename(course_code: &str, extension: &str) -> String {
        let code: String = course_code
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let code = if code.is_empty() { "course".to_string() } else { code };
        format!("{code}_grades.{extension}")
    }
}
