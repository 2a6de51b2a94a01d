//! Role-specific landing data.

use axum::{Json, Router, extract::State, routing::get};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::courses::{CourseResponse, visible_courses};
use crate::{AppState, error::ApiError, middleware::CurrentPrincipal};
use edupace_core::access::{PermissionError, Role, RoleKind};
use edupace_db::{
    CourseRepository, GradeRepository, OutcomeRepository, TranscriptRow,
    entities::sea_orm_active_enums::OutcomeKind,
};

/// Creates the dashboard routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

// ============================================================================
// Response Types
// ============================================================================

/// Dashboard payload, tagged by the caller's role.
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardResponse {
    /// Enrolled courses and the student's own grades.
    Student {
        /// Enrolled courses.
        courses: Vec<CourseResponse>,
        /// Own grades, newest term first.
        grades: Vec<TranscriptEntry>,
    },
    /// Assigned courses with outcome coverage.
    Teacher {
        /// Assigned courses.
        courses: Vec<CourseResponse>,
        /// Number of assigned courses.
        total_courses: usize,
        /// Assigned courses with at least one learning outcome.
        courses_with_learning_outcomes: usize,
    },
    /// Every course with lock counts.
    AcademicBoard {
        /// All courses.
        courses: Vec<CourseResponse>,
        /// Number of courses.
        total_courses: u64,
        /// Locked courses.
        locked_courses: u64,
        /// Unlocked courses.
        active_courses: u64,
    },
}

/// One of the student's own grades.
#[derive(Debug, Serialize)]
pub struct TranscriptEntry {
    /// Course ID.
    pub course_id: Uuid,
    /// Course code.
    pub course_code: String,
    /// Course name.
    pub course_name: String,
    /// Letter grade.
    pub grade: String,
    /// Optional percentage.
    pub percentage: Option<Decimal>,
    /// Semester label.
    pub semester: String,
    /// Academic year label.
    pub academic_year: String,
}

impl From<TranscriptRow> for TranscriptEntry {
    fn from(row: TranscriptRow) -> Self {
        Self {
            course_id: row.course_id,
            course_code: row.course_code,
            course_name: row.course_name,
            grade: row.grade,
            percentage: row.percentage,
            semester: row.semester,
            academic_year: row.academic_year,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/dashboard` - Landing data for the caller's role.
async fn get_dashboard(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
) -> Result<Json<DashboardResponse>, ApiError> {
    let courses = visible_courses(&state, &principal).await?;

    let response = match &principal.role {
        Role::Student(student) => {
            let grades = GradeRepository::new((*state.db).clone())
                .transcript(student.id.into_inner())
                .await?;
            DashboardResponse::Student {
                courses: courses.into_iter().map(CourseResponse::from).collect(),
                grades: grades.into_iter().map(TranscriptEntry::from).collect(),
            }
        }
        Role::Teacher(_) => {
            let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
            let with_outcomes = OutcomeRepository::new((*state.db).clone())
                .courses_with_outcomes(&ids, OutcomeKind::Learning)
                .await?;
            DashboardResponse::Teacher {
                total_courses: courses.len(),
                courses_with_learning_outcomes: with_outcomes,
                courses: courses.into_iter().map(CourseResponse::from).collect(),
            }
        }
        Role::AcademicBoard(_) => {
            let (total, locked) = CourseRepository::new((*state.db).clone())
                .counts()
                .await?;
            DashboardResponse::AcademicBoard {
                courses: courses.into_iter().map(CourseResponse::from).collect(),
                total_courses: total,
                locked_courses: locked,
                active_courses: total.saturating_sub(locked),
            }
        }
        Role::None => {
            return Err(PermissionError::WrongRole {
                required: RoleKind::AcademicBoard,
            }
            .into());
        }
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_is_tagged_by_role() {
        let board = DashboardResponse::AcademicBoard {
            courses: Vec::new(),
            total_courses: 5,
            locked_courses: 2,
            active_courses: 3,
        };

        let value = serde_json::to_value(&board).unwrap();
        assert_eq!(value["role"], "academic_board");
        assert_eq!(value["active_courses"], 3);
    }

    #[test]
    fn test_transcript_row_becomes_entry() {
        let row = TranscriptRow {
            course_id: Uuid::nil(),
            course_code: "CS101".into(),
            course_name: "Intro".into(),
            grade: "B+".into(),
            percentage: Some(Decimal::new(8750, 2)),
            semester: "Fall".into(),
            academic_year: "2025-2026".into(),
        };

        let value = serde_json::to_value(TranscriptEntry::from(row)).unwrap();
        assert_eq!(value["course_code"], "CS101");
        assert_eq!(value["grade"], "B+");
        assert_eq!(value["percentage"], "87.50");
    }

    #[test]
    fn test_teacher_dashboard_counts() {
        let teacher = DashboardResponse::Teacher {
            courses: Vec::new(),
            total_courses: 2,
            courses_with_learning_outcomes: 1,
        };

        let value = serde_json::to_value(&teacher).unwrap();
        assert_eq!(value["role"], "teacher");
        assert_eq!(value["courses_with_learning_outcomes"], 1);
    }
}
