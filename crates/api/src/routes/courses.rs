//! Course management routes.
//!
//! Every handler loads the course first and calls its guard before any write.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::CurrentPrincipal};
use edupace_core::access::{
    CourseState, PermissionError, Principal, Role, RoleKind, require_assign_teacher,
    require_create_course, require_delete_course, require_edit_course, require_toggle_lock,
    require_view_course,
};
use edupace_core::auth::display_name;
use edupace_core::course::CourseDraft;
use edupace_db::{
    CourseRepository, ProfileRepository, entities::courses, repositories::course_state,
};

/// Credits assigned when a request omits them.
const DEFAULT_CREDITS: i16 = 3;

/// Creates the course routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{course_id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{course_id}/lock", post(lock_course))
        .route("/courses/{course_id}/unlock", post(unlock_course))
        .route("/courses/{course_id}/teachers", post(assign_teacher))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or replacing a course.
#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    /// Unique course code.
    pub code: String,
    /// Course name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Credit hours (1-10).
    pub credits: Option<i16>,
}

impl CourseRequest {
    fn into_draft(self) -> CourseDraft {
        CourseDraft {
            code: self.code,
            name: self.name,
            description: self.description,
            credits: self.credits.unwrap_or(DEFAULT_CREDITS),
        }
    }
}

/// Request body for assigning a teacher.
#[derive(Debug, Deserialize)]
pub struct AssignTeacherRequest {
    /// Teacher profile ID.
    pub teacher_id: Uuid,
}

/// Response for a course.
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    /// Course ID.
    pub id: Uuid,
    /// Course code.
    pub code: String,
    /// Course name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Credit hours.
    pub credits: i16,
    /// Whether the course is locked.
    pub is_locked: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<courses::Model> for CourseResponse {
    fn from(course: courses::Model) -> Self {
        Self {
            id: course.id,
            code: course.code,
            name: course.name,
            description: course.description,
            credits: course.credits,
            is_locked: course.is_locked,
            created_at: course.created_at.to_rfc3339(),
            updated_at: course.updated_at.to_rfc3339(),
        }
    }
}

/// A person attached to a course.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// Profile ID.
    pub id: Uuid,
    /// Student ID or employee ID.
    pub identifier: String,
    /// Full name, or the login handle.
    pub name: String,
}

/// Response for a course with its teachers and roster.
#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    /// The course.
    #[serde(flatten)]
    pub course: CourseResponse,
    /// Assigned teachers.
    pub teachers: Vec<MemberResponse>,
    /// Enrolled students; omitted for students.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<MemberResponse>>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads a course and its permission state, or 404.
pub(crate) async fn load_course(
    state: &AppState,
    course_id: Uuid,
) -> Result<(courses::Model, CourseState), ApiError> {
    let course = CourseRepository::new((*state.db).clone())
        .find_by_id(course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course"))?;
    let course_state = course_state(&course);
    Ok((course, course_state))
}

fn member_name(user: Option<&edupace_db::entities::users::Model>) -> String {
    user.map(|u| display_name(&u.first_name, &u.last_name, &u.username))
        .unwrap_or_default()
}

/// Courses visible to the principal, ordered by code.
pub(crate) async fn visible_courses(
    state: &AppState,
    principal: &Principal,
) -> Result<Vec<courses::Model>, ApiError> {
    let repo = CourseRepository::new((*state.db).clone());
    let courses = match &principal.role {
        Role::AcademicBoard(_) => repo.list_all().await?,
        Role::Teacher(t) => repo.list_by_ids(t.course_ids.iter().copied()).await?,
        Role::Student(s) => repo.list_by_ids(s.course_ids.iter().copied()).await?,
        Role::None if principal.is_authenticated() => {
            return Err(PermissionError::WrongRole {
                required: RoleKind::AcademicBoard,
            }
            .into());
        }
        Role::None => return Err(PermissionError::Unauthenticated.into()),
    };
    Ok(courses)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/courses` - Courses visible to the caller.
async fn list_courses(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = visible_courses(&state, &principal).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// POST `/courses` - Create a course.
async fn create_course(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Json(payload): Json<CourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    require_create_course(&principal)?;
    let draft = payload.into_draft().validated()?;

    let course = CourseRepository::new((*state.db).clone())
        .create(draft)
        .await?;

    info!(course_id = %course.id, code = %course.code, "Course created");
    Ok((StatusCode::CREATED, Json(course.into())))
}

/// GET `/courses/{course_id}` - Course detail with teachers and roster.
async fn get_course(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let (course, course_state) = load_course(&state, course_id).await?;
    require_view_course(&principal, &course_state)?;

    let profiles = ProfileRepository::new((*state.db).clone());
    let teachers = profiles
        .teachers_in_course(course_id)
        .await?
        .into_iter()
        .map(|t| MemberResponse {
            name: member_name(t.user.as_ref()),
            id: t.teacher.id,
            identifier: t.teacher.employee_id,
        })
        .collect();

    let students = if principal.kind() == RoleKind::Student {
        None
    } else {
        Some(
            profiles
                .students_in_course(course_id)
                .await?
                .into_iter()
                .map(|s| MemberResponse {
                    name: member_name(s.user.as_ref()),
                    id: s.student.id,
                    identifier: s.student.student_id,
                })
                .collect(),
        )
    };

    Ok(Json(CourseDetailResponse {
        course: course.into(),
        teachers,
        students,
    }))
}

/// PUT `/courses/{course_id}` - Replace a course's fields.
async fn update_course(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let (_, course_state) = load_course(&state, course_id).await?;
    require_edit_course(&principal, &course_state)?;
    let draft = payload.into_draft().validated()?;

    let course = CourseRepository::new((*state.db).clone())
        .update(course_id, draft)
        .await?;

    info!(course_id = %course.id, "Course updated");
    Ok(Json(course.into()))
}

/// DELETE `/courses/{course_id}` - Delete a course and everything it owns.
async fn delete_course(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (_, course_state) = load_course(&state, course_id).await?;
    require_delete_course(&principal, &course_state)?;

    CourseRepository::new((*state.db).clone())
        .delete(course_id)
        .await?;

    info!(course_id = %course_id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_lock(
    state: &AppState,
    principal: &Principal,
    course_id: Uuid,
    locked: bool,
) -> Result<Json<CourseResponse>, ApiError> {
    let (_, course_state) = load_course(state, course_id).await?;
    require_toggle_lock(principal, &course_state)?;

    let course = CourseRepository::new((*state.db).clone())
        .set_locked(course_id, locked)
        .await?;

    info!(course_id = %course_id, locked, "Course lock changed");
    Ok(Json(course.into()))
}

/// POST `/courses/{course_id}/lock` - Lock a course against modification.
async fn lock_course(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseResponse>, ApiError> {
    set_lock(&state, &principal, course_id, true).await
}

/// POST `/courses/{course_id}/unlock` - Unlock a course.
async fn unlock_course(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseResponse>, ApiError> {
    set_lock(&state, &principal, course_id, false).await
}

/// POST `/courses/{course_id}/teachers` - Assign a teacher.
async fn assign_teacher(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<AssignTeacherRequest>,
) -> Result<StatusCode, ApiError> {
    let (_, course_state) = load_course(&state, course_id).await?;
    require_assign_teacher(&principal, &course_state)?;

    CourseRepository::new((*state.db).clone())
        .assign_teacher(course_id, payload.teacher_id)
        .await?;

    info!(course_id = %course_id, teacher_id = %payload.teacher_id, "Teacher assigned");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credits_default_to_three() {
        let request: CourseRequest =
            serde_json::from_str(r#"{"code":"CS101","name":"Intro"}"#).unwrap();
        let draft = request.into_draft();

        assert_eq!(draft.credits, DEFAULT_CREDITS);
        assert_eq!(draft.description, "");
    }

    #[test]
    fn test_detail_flattens_course_fields() {
        let detail = CourseDetailResponse {
            course: CourseResponse {
                id: Uuid::nil(),
                code: "CS101".into(),
                name: "Intro".into(),
                description: String::new(),
                credits: 3,
                is_locked: false,
                created_at: String::new(),
                updated_at: String::new(),
            },
            teachers: Vec::new(),
            students: None,
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["code"], "CS101");
        assert!(value.get("students").is_none());
    }
}
