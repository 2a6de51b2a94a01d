//! Grade routes: listing, spreadsheet upload and manual entry.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::courses::load_course;
use crate::{AppState, error::ApiError, middleware::CurrentPrincipal};
use edupace_core::access::{
    PermissionError, Principal, require_upload_grades, require_view_course,
};
use edupace_core::grading::{
    GradeIngestService, IngestError, IngestResult, IngestTarget, ManualGradeEntry, RowError,
    Sheet, UpsertOutcome,
};
use edupace_db::{GradeRepository, repositories::GradeRecord};
use edupace_shared::{AppError, GradingConfig, types::CourseId};

/// Room for multipart boundaries and the text fields around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Creates the grade routes (requires auth middleware to be applied externally).
pub fn routes(grading: &GradingConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/grades",
            get(list_grades).put(record_grade),
        )
        .route(
            "/courses/{course_id}/grades/upload",
            post(upload_grades).layer(DefaultBodyLimit::max(
                grading.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for one grade.
#[derive(Debug, Serialize)]
pub struct GradeResponse {
    /// Grade ID.
    pub id: Uuid,
    /// Student profile ID.
    pub student_id: Uuid,
    /// External student identifier.
    pub student_identifier: String,
    /// Student name.
    pub student_name: String,
    /// Letter grade.
    pub grade: String,
    /// Optional percentage.
    pub percentage: Option<Decimal>,
    /// Semester label.
    pub semester: String,
    /// Academic year label.
    pub academic_year: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<GradeRecord> for GradeResponse {
    fn from(record: GradeRecord) -> Self {
        Self {
            student_name: record.student_name(),
            id: record.id,
            student_id: record.student_id,
            student_identifier: record.student_identifier,
            grade: record.grade,
            percentage: record.percentage,
            semester: record.semester,
            academic_year: record.academic_year,
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// A rejected row as reported to the uploader.
#[derive(Debug, Serialize)]
pub struct RowErrorResponse {
    /// Spreadsheet row number.
    pub row: u32,
    /// Student identifier from the row, when present.
    pub student_id: Option<String>,
    /// What went wrong.
    pub message: String,
}

impl From<&RowError> for RowErrorResponse {
    fn from(error: &RowError) -> Self {
        Self {
            row: error.row,
            student_id: error.student_id.clone(),
            message: error.to_string(),
        }
    }
}

/// Response for an upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Human-readable summary.
    pub message: String,
    /// Records inserted.
    pub created: u32,
    /// Records overwritten.
    pub updated: u32,
    /// Total rejected rows.
    pub error_count: usize,
    /// The first rejected rows, capped by configuration.
    pub errors: Vec<RowErrorResponse>,
}

impl UploadResponse {
    /// Builds the response, echoing at most `max_errors` row errors.
    pub fn new(result: &IngestResult, max_errors: usize) -> Self {
        Self {
            message: result.summary(),
            created: result.created,
            updated: result.updated,
            error_count: result.errors.len(),
            errors: result
                .errors
                .iter()
                .take(max_errors)
                .map(RowErrorResponse::from)
                .collect(),
        }
    }
}

/// Request body for a manually entered grade.
#[derive(Debug, Deserialize)]
pub struct ManualGradeRequest {
    /// External student identifier.
    pub student_id: String,
    /// Letter grade.
    pub grade: String,
    /// Percentage as a number or string.
    #[serde(default)]
    pub percentage: Value,
    /// Semester label.
    #[serde(default)]
    pub semester: String,
    /// Academic year label.
    #[serde(default)]
    pub academic_year: String,
}

/// Response for a manually entered grade.
#[derive(Debug, Serialize)]
pub struct ManualGradeResponse {
    /// `created` or `updated`.
    pub outcome: &'static str,
    /// Human-readable summary.
    pub message: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn percentage_text(value: Value) -> Result<Option<String>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(ApiError::bad_request(
            "invalid_entry",
            "Percentage must be a number or a string",
        )),
    }
}

fn multipart_error(err: &MultipartError) -> ApiError {
    ApiError::new(err.status(), "invalid_upload", err.body_text())
}

fn ingest_service(state: &AppState) -> GradeIngestService<GradeRepository> {
    GradeIngestService::new(Arc::new(GradeRepository::new((*state.db).clone())))
}

fn target(
    course_id: Uuid,
    principal: &Principal,
    semester: &str,
    year: &str,
) -> Result<IngestTarget, ApiError> {
    Ok(IngestTarget {
        course_id: CourseId::from_uuid(course_id),
        semester: semester.trim().to_string(),
        academic_year: year.trim().to_string(),
        actor: principal.user_id.ok_or(PermissionError::Unauthenticated)?,
    })
}

/// Fields collected from an upload form.
#[derive(Default)]
struct UploadForm {
    filename: String,
    file: Option<Vec<u8>>,
    semester: String,
    academic_year: String,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
                form.file = Some(bytes.to_vec());
            }
            "semester" => form.semester = field.text().await.map_err(|e| multipart_error(&e))?,
            "academic_year" => {
                form.academic_year = field.text().await.map_err(|e| multipart_error(&e))?;
            }
            _ => {}
        }
    }
    Ok(form)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/courses/{course_id}/grades` - Course grades; students see only their own.
async fn list_grades(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<GradeResponse>>, ApiError> {
    let (_, course_state) = load_course(&state, course_id).await?;
    require_view_course(&principal, &course_state)?;

    let only_student = principal.student().map(|s| s.id.into_inner());
    let records = GradeRepository::new((*state.db).clone())
        .list_for_course(course_id, only_student)
        .await?;

    Ok(Json(records.into_iter().map(GradeResponse::from).collect()))
}

/// POST `/courses/{course_id}/grades/upload` - Ingest a CSV or workbook.
///
/// Multipart fields: `file`, `semester`, `academic_year`.
async fn upload_grades(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (course, course_state) = load_course(&state, course_id).await?;
    require_upload_grades(&principal, &course_state)?;

    let form = read_upload_form(multipart).await?;
    let Some(bytes) = form.file else {
        return Err(ApiError::bad_request("missing_file", "A file is required"));
    };
    if bytes.len() > state.grading.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "The uploaded file exceeds {} bytes",
            state.grading.max_upload_bytes
        ))
        .into());
    }

    let filename = form.filename.clone();
    let sheet = tokio::task::spawn_blocking(move || Sheet::parse(&filename, &bytes))
        .await
        .map_err(|e| ApiError::internal("Sheet parsing task failed", e))?
        .map_err(IngestError::Sheet)?;

    let target = target(course_id, &principal, &form.semester, &form.academic_year)?;
    let result = ingest_service(&state)
        .ingest(&principal, &course_state, &sheet, &target)
        .await?;

    info!(
        course_id = %course_id,
        code = %course.code,
        filename = %form.filename,
        created = result.created,
        updated = result.updated,
        errors = result.errors.len(),
        "Grades uploaded"
    );
    Ok(Json(UploadResponse::new(
        &result,
        state.grading.max_reported_errors,
    )))
}

/// PUT `/courses/{course_id}/grades` - Record one grade by hand.
async fn record_grade(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ManualGradeRequest>,
) -> Result<(StatusCode, Json<ManualGradeResponse>), ApiError> {
    let (_, course_state) = load_course(&state, course_id).await?;
    require_upload_grades(&principal, &course_state)?;

    let target = target(course_id, &principal, &payload.semester, &payload.academic_year)?;
    let entry = ManualGradeEntry {
        student_identifier: payload.student_id,
        grade: payload.grade,
        percentage: percentage_text(payload.percentage)?,
    };

    let outcome = ingest_service(&state)
        .record_grade(&principal, &course_state, &entry, &target)
        .await?;

    info!(course_id = %course_id, student = %entry.student_identifier, ?outcome, "Grade recorded");
    let (status, label) = match outcome {
        UpsertOutcome::Created => (StatusCode::CREATED, "created"),
        UpsertOutcome::Updated => (StatusCode::OK, "updated"),
    };
    Ok((
        status,
        Json(ManualGradeResponse {
            outcome: label,
            message: format!("Grade {label}."),
        }),
    ))
}
