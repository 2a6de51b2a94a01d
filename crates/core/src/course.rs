//! Course and outcome field validation.

use thiserror::Error;

/// Longest course or outcome code.
pub const MAX_CODE_LEN: usize = 20;
/// Longest course name.
pub const MAX_NAME_LEN: usize = 200;
/// Credit range, inclusive.
pub const CREDIT_RANGE: std::ops::RangeInclusive<i16> = 1..=10;

/// A course field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseValidationError {
    /// Code is blank or too long.
    #[error("Code must be 1 to 20 characters")]
    Code,
    /// Name is blank or too long.
    #[error("Name must be 1 to 200 characters")]
    Name,
    /// Credits outside the accepted range.
    #[error("Credits must be between 1 and 10, got {0}")]
    Credits(i16),
    /// Outcome description is blank.
    #[error("Description must not be empty")]
    Description,
}

/// Fields of a course create or update.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Credit hours.
    pub credits: i16,
}

impl CourseDraft {
    /// Trims text fields and checks limits.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails.
    pub fn validated(self) -> Result<Self, CourseValidationError> {
        let code = validate_code(&self.code)?;
        let name = self.name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(CourseValidationError::Name);
        }
        if !CREDIT_RANGE.contains(&self.credits) {
            return Err(CourseValidationError::Credits(self.credits));
        }
        Ok(Self {
            code,
            name,
            description: self.description.trim().to_string(),
            credits: self.credits,
        })
    }
}

/// Fields of a program or learning outcome.
#[derive(Debug, Clone)]
pub struct OutcomeDraft {
    /// Code, unique within the course.
    pub code: String,
    /// What the outcome states.
    pub description: String,
}

impl OutcomeDraft {
    /// Trims fields and checks limits.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails.
    pub fn validated(self) -> Result<Self, CourseValidationError> {
        let code = validate_code(&self.code)?;
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(CourseValidationError::Description);
        }
        Ok(Self { code, description })
    }
}

fn validate_code(raw: &str) -> Result<String, CourseValidationError> {
    let code = raw.trim();
    if code.is_empty() || code.chars().count() > MAX_CODE_LEN {
        return Err(CourseValidationError::Code);
    }
    Ok(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(code: &str, name: &str, credits: i16) -> CourseDraft {
        CourseDraft {
            code: code.to_string(),
            name: name.to_string(),
            description: "  Basics.  ".to_string(),
            credits,
        }
    }

    #[test]
    fn test_valid_course_is_trimmed() {
        let course = draft(" CS101 ", " Intro ", 3).validated().unwrap();
        assert_eq!(course.code, "CS101");
        assert_eq!(course.name, "Intro");
        assert_eq!(course.description, "Basics.");
    }

    #[rstest]
    #[case(draft("", "Intro", 3), CourseValidationError::Code)]
    #[case(draft(&"X".repeat(21), "Intro", 3), CourseValidationError::Code)]
    #[case(draft("CS101", "  ", 3), CourseValidationError::Name)]
    #[case(draft("CS101", &"N".repeat(201), 3), CourseValidationError::Name)]
    #[case(draft("CS101", "Intro", 0), CourseValidationError::Credits(0))]
    #[case(draft("CS101", "Intro", 11), CourseValidationError::Credits(11))]
    fn test_invalid_course(#[case] input: CourseDraft, #[case] expected: CourseValidationError) {
        assert_eq!(input.validated().unwrap_err(), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(10)]
    fn test_credit_bounds_inclusive(#[case] credits: i16) {
        assert!(draft("CS101", "Intro", credits).validated().is_ok());
    }

    #[test]
    fn test_outcome_requires_description() {
        let outcome = OutcomeDraft {
            code: "PO1".to_string(),
            description: " ".to_string(),
        };
        assert_eq!(
            outcome.validated().unwrap_err(),
            CourseValidationError::Description
        );
    }
}
