//! Header classification for uploaded grade sheets.

use serde::Serialize;

/// Canonical field a sheet column maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeField {
    /// External student identifier.
    StudentId,
    /// Letter grade.
    Grade,
    /// Optional numeric percentage.
    Percentage,
}

impl GradeField {
    /// Column label used in error messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StudentId => "Student ID",
            Self::Grade => "Grade",
            Self::Percentage => "Percentage",
        }
    }
}

/// Lowercases and trims a header cell.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Classifies a single header. The first matching rule applies.
#[must_use]
pub fn classify_header(raw: &str) -> Option<GradeField> {
    let header = normalize_header(raw);
    if header.contains("student") && header.contains("id") {
        Some(GradeField::StudentId)
    } else if header.contains("grade") {
        Some(GradeField::Grade)
    } else if header.contains("percentage") || header.contains("percent") {
        Some(GradeField::Percentage)
    } else {
        None
    }
}

/// Column positions of the canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    /// Student ID column.
    pub student_id: usize,
    /// Grade column.
    pub grade: usize,
    /// Percentage column, if the sheet has one.
    pub percentage: Option<usize>,
}

impl ColumnMap {
    /// Maps headers to fields. For each field the leftmost matching column wins.
    ///
    /// # Errors
    ///
    /// Returns the required fields that no column matched.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, Vec<GradeField>> {
        let mut student_id = None;
        let mut grade = None;
        let mut percentage = None;

        for (index, header) in headers.iter().enumerate() {
            let slot = match classify_header(header.as_ref()) {
                Some(GradeField::StudentId) => &mut student_id,
                Some(GradeField::Grade) => &mut grade,
                Some(GradeField::Percentage) => &mut percentage,
                None => continue,
            };
            slot.get_or_insert(index);
        }

        match (student_id, grade) {
            (Some(student_id), Some(grade)) => Ok(Self {
                student_id,
                grade,
                percentage,
            }),
            (student_id, grade) => {
                let mut missing = Vec::new();
                if student_id.is_none() {
                    missing.push(GradeField::StudentId);
                }
                if grade.is_none() {
                    missing.push(GradeField::Grade);
                }
                Err(missing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("Student ID", Some(GradeField::StudentId))]
    #[case("  student_id ", Some(GradeField::StudentId))]
    #[case("STUDENTID", Some(GradeField::StudentId))]
    #[case("Grade", Some(GradeField::Grade))]
    #[case("Final Grade", Some(GradeField::Grade))]
    #[case("Percentage", Some(GradeField::Percentage))]
    #[case("Percent", Some(GradeField::Percentage))]
    #[case("Score %", None)]
    #[case("Student Name", None)]
    #[case("", None)]
    fn test_classify_header(#[case] header: &str, #[case] expected: Option<GradeField>) {
        assert_eq!(classify_header(header), expected);
    }

    #[test]
    fn test_student_id_rule_beats_grade_rule() {
        // Contains "student", "id" and "grade"; the student-id rule is checked first.
        assert_eq!(
            classify_header("Student ID (grade 10)"),
            Some(GradeField::StudentId)
        );
    }

    #[test]
    fn test_map_with_extra_columns() {
        let map =
            ColumnMap::from_headers(&["Name", "Student ID", "Percentage", "Grade"]).unwrap();
        assert_eq!(map.student_id, 1);
        assert_eq!(map.grade, 3);
        assert_eq!(map.percentage, Some(2));
    }

    #[test]
    fn test_leftmost_duplicate_wins() {
        let map = ColumnMap::from_headers(&["Student ID", "Grade", "Letter Grade"]).unwrap();
        assert_eq!(map.grade, 1);
    }

    #[test]
    fn test_percentage_is_optional() {
        let map = ColumnMap::from_headers(&["student id", "grade"]).unwrap();
        assert_eq!(map.percentage, None);
    }

    #[rstest]
    #[case(&["Student ID", "Percentage"], &[GradeField::Grade])]
    #[case(&["Name", "Grade"], &[GradeField::StudentId])]
    #[case(&["Name"], &[GradeField::StudentId, GradeField::Grade])]
    fn test_missing_required(#[case] headers: &[&str], #[case] missing: &[GradeField]) {
        assert_eq!(ColumnMap::from_headers(headers).unwrap_err(), missing);
    }

    proptest! {
        /// Classification ignores case and surrounding whitespace.
        #[test]
        fn prop_classification_is_case_and_space_insensitive(
            header in "[a-zA-Z %_]{0,24}",
            pad in " {0,3}",
        ) {
            let padded = format!("{pad}{}{pad}", header.to_uppercase());
            prop_assert_eq!(classify_header(&header), classify_header(&padded));
        }
    }
}
