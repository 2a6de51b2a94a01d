//! Program and learning outcome routes.
//!
//! Program outcomes belong to the academic board, learning outcomes to the
//! course's assigned teachers. Both lists are readable by anyone who can view
//! the course.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::courses::load_course;
use crate::{AppState, error::ApiError, middleware::CurrentPrincipal};
use edupace_core::access::{
    CourseState, PermissionError, Principal, require_modify_learning_outcome,
    require_modify_program_outcome, require_view_course,
};
use edupace_core::course::OutcomeDraft;
use edupace_db::{
    OutcomeRepository,
    entities::{course_outcomes, sea_orm_active_enums::OutcomeKind},
};

/// Creates the outcome routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/program-outcomes",
            get(list_program_outcomes).post(create_program_outcome),
        )
        .route(
            "/program-outcomes/{outcome_id}",
            put(update_program_outcome).delete(delete_program_outcome),
        )
        .route(
            "/courses/{course_id}/learning-outcomes",
            get(list_learning_outcomes).post(create_learning_outcome),
        )
        .route(
            "/learning-outcomes/{outcome_id}",
            put(update_learning_outcome).delete(delete_learning_outcome),
        )
}

/// Request body for creating or replacing an outcome.
#[derive(Debug, Deserialize)]
pub struct OutcomeRequest {
    /// Code, unique within the course.
    pub code: String,
    /// Description.
    pub description: String,
}

/// Response for an outcome.
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    /// Outcome ID.
    pub id: Uuid,
    /// Owning course.
    pub course_id: Uuid,
    /// `program` or `learning`.
    pub kind: OutcomeKind,
    /// Code.
    pub code: String,
    /// Description.
    pub description: String,
    /// Author.
    pub created_by: Option<Uuid>,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<course_outcomes::Model> for OutcomeResponse {
    fn from(outcome: course_outcomes::Model) -> Self {
        Self {
            id: outcome.id,
            course_id: outcome.course_id,
            kind: outcome.kind,
            code: outcome.code,
            description: outcome.description,
            created_by: outcome.created_by,
            updated_at: outcome.updated_at.to_rfc3339(),
        }
    }
}

/// The mutation guard for each outcome kind.
fn require_modify(
    kind: OutcomeKind,
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    match kind {
        OutcomeKind::Program => require_modify_program_outcome(principal, course),
        OutcomeKind::Learning => require_modify_learning_outcome(principal, course),
    }
}

fn label(kind: OutcomeKind) -> &'static str {
    match kind {
        OutcomeKind::Program => "Program outcome",
        OutcomeKind::Learning => "Learning outcome",
    }
}

async fn list(
    state: &AppState,
    principal: &Principal,
    course_id: Uuid,
    kind: OutcomeKind,
) -> Result<Json<Vec<OutcomeResponse>>, ApiError> {
    let (_, course_state) = load_course(state, course_id).await?;
    require_view_course(principal, &course_state)?;

    let outcomes = OutcomeRepository::new((*state.db).clone())
        .list(course_id, kind)
        .await?;
    Ok(Json(outcomes.into_iter().map(OutcomeResponse::from).collect()))
}

async fn create(
    state: &AppState,
    principal: &Principal,
    course_id: Uuid,
    kind: OutcomeKind,
    payload: OutcomeRequest,
) -> Result<(StatusCode, Json<OutcomeResponse>), ApiError> {
    let (_, course_state) = load_course(state, course_id).await?;
    require_modify(kind, principal, &course_state)?;
    let actor = principal.user_id.ok_or(PermissionError::Unauthenticated)?;

    let draft = OutcomeDraft {
        code: payload.code,
        description: payload.description,
    }
    .validated()?;

    let outcome = OutcomeRepository::new((*state.db).clone())
        .create(course_id, kind, draft, actor.into_inner())
        .await?;

    info!(outcome_id = %outcome.id, course_id = %course_id, kind = ?kind, "Outcome created");
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Loads an outcome of `kind` and the state of its course.
async fn load_outcome(
    state: &AppState,
    outcome_id: Uuid,
    kind: OutcomeKind,
) -> Result<(course_outcomes::Model, CourseState), ApiError> {
    let outcome = OutcomeRepository::new((*state.db).clone())
        .find(outcome_id, kind)
        .await?
        .ok_or_else(|| ApiError::not_found(label(kind)))?;
    let (_, course_state) = load_course(state, outcome.course_id).await?;
    Ok((outcome, course_state))
}

async fn update(
    state: &AppState,
    principal: &Principal,
    outcome_id: Uuid,
    kind: OutcomeKind,
    payload: OutcomeRequest,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let (outcome, course_state) = load_outcome(state, outcome_id, kind).await?;
    require_modify(kind, principal, &course_state)?;

    let draft = OutcomeDraft {
        code: payload.code,
        description: payload.description,
    }
    .validated()?;

    let outcome = OutcomeRepository::new((*state.db).clone())
        .update(outcome, draft)
        .await?;

    info!(outcome_id = %outcome.id, "Outcome updated");
    Ok(Json(outcome.into()))
}

async fn delete(
    state: &AppState,
    principal: &Principal,
    outcome_id: Uuid,
    kind: OutcomeKind,
) -> Result<StatusCode, ApiError> {
    let (_, course_state) = load_outcome(state, outcome_id, kind).await?;
    require_modify(kind, principal, &course_state)?;

    OutcomeRepository::new((*state.db).clone())
        .delete(outcome_id)
        .await?;

    info!(outcome_id = %outcome_id, "Outcome deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/courses/{course_id}/program-outcomes`
async fn list_program_outcomes(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<OutcomeResponse>>, ApiError> {
    list(&state, &principal, course_id, OutcomeKind::Program).await
}

/// POST `/courses/{course_id}/program-outcomes`
async fn create_program_outcome(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<OutcomeRequest>,
) -> Result<(StatusCode, Json<OutcomeResponse>), ApiError> {
    create(&state, &principal, course_id, OutcomeKind::Program, payload).await
}

/// PUT `/program-outcomes/{outcome_id}`
async fn update_program_outcome(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(outcome_id): Path<Uuid>,
    Json(payload): Json<OutcomeRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    update(&state, &principal, outcome_id, OutcomeKind::Program, payload).await
}

/// DELETE `/program-outcomes/{outcome_id}`
async fn delete_program_outcome(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(outcome_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &principal, outcome_id, OutcomeKind::Program).await
}

/// GET `/courses/{course_id}/learning-outcomes`
async fn list_learning_outcomes(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<OutcomeResponse>>, ApiError> {
    list(&state, &principal, course_id, OutcomeKind::Learning).await
}

/// POST `/courses/{course_id}/learning-outcomes`
async fn create_learning_outcome(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<OutcomeRequest>,
) -> Result<(StatusCode, Json<OutcomeResponse>), ApiError> {
    create(&state, &principal, course_id, OutcomeKind::Learning, payload).await
}

/// PUT `/learning-outcomes/{outcome_id}`
async fn update_learning_outcome(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(outcome_id): Path<Uuid>,
    Json(payload): Json<OutcomeRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    update(&state, &principal, outcome_id, OutcomeKind::Learning, payload).await
}

/// DELETE `/learning-outcomes/{outcome_id}`
async fn delete_learning_outcome(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(outcome_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &principal, outcome_id, OutcomeKind::Learning).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use edupace_core::access::{ProfileSet, TeacherProfile};
    use edupace_shared::types::{CourseId, TeacherId, UserId};

    fn teacher_of(course: CourseId) -> Principal {
        Principal::authenticated(
            UserId::new(),
            ProfileSet {
                teacher: Some(TeacherProfile {
                    id: TeacherId::new(),
                    employee_id: "T-1".into(),
                    course_ids: [course].into_iter().collect(),
                }),
                ..ProfileSet::default()
            },
        )
    }

    #[test]
    fn test_teacher_may_modify_learning_but_not_program_outcomes() {
        let course = CourseState::new(CourseId::new(), false);
        let teacher = teacher_of(course.id);

        assert!(require_modify(OutcomeKind::Learning, &teacher, &course).is_ok());
        assert!(matches!(
            require_modify(OutcomeKind::Program, &teacher, &course),
            Err(PermissionError::WrongRole { .. })
        ));
    }

    #[test]
    fn test_locked_course_blocks_learning_outcomes() {
        let course = CourseState::new(CourseId::new(), true);
        let teacher = teacher_of(course.id);

        assert_eq!(
            require_modify(OutcomeKind::Learning, &teacher, &course),
            Err(PermissionError::CourseLocked)
        );
    }
}
