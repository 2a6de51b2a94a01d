//! Grade report exports.
//!
//! PDF rendering is CPU bound and runs on the blocking pool.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::info;
use uuid::Uuid;

use super::courses::load_course;
use crate::{AppState, error::ApiError, middleware::CurrentPrincipal};
use edupace_core::access::require_export_grades;
use edupace_core::reports::{ReportCourse, ReportService, TabularDocument, render_csv, render_pdf};
use edupace_db::GradeRepository;

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses/{course_id}/grades/report.pdf", get(export_pdf))
        .route("/courses/{course_id}/grades/report.csv", get(export_csv))
}

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }

    const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

/// Loads, guards, and shapes a course's grades into a document.
async fn build_document(
    state: &AppState,
    principal: &CurrentPrincipal,
    course_id: Uuid,
) -> Result<(TabularDocument, String), ApiError> {
    let (course, course_state) = load_course(state, course_id).await?;
    require_export_grades(principal, &course_state)?;

    let rows = GradeRepository::new((*state.db).clone())
        .report_rows(course_id)
        .await?;
    let document = ReportService::build_grade_report(
        &ReportCourse {
            code: course.code.clone(),
            name: course.name,
        },
        &rows,
    )?;
    Ok((document, course.code))
}

async fn export(
    state: &AppState,
    principal: &CurrentPrincipal,
    course_id: Uuid,
    format: ReportFormat,
) -> Result<Response, ApiError> {
    let (document, code) = build_document(state, principal, course_id).await?;

    let bytes = match format {
        ReportFormat::Pdf => tokio::task::spawn_blocking(move || render_pdf(&document))
            .await
            .map_err(|e| ApiError::internal("PDF render task failed", e))??,
        ReportFormat::Csv => render_csv(&document)?,
    };

    let filename = ReportService::report_filename(&code, format.extension());
    info!(course_id = %course_id, filename = %filename, size = bytes.len(), "Grade report exported");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        bytes,
    )
        .into_response())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/courses/{course_id}/grades/report.pdf`
async fn export_pdf(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    export(&state, &principal, course_id, ReportFormat::Pdf).await
}

/// GET `/courses/{course_id}/grades/report.csv`
async fn export_csv(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(course_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    export(&state, &principal, course_id, ReportFormat::Csv).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_quotes_filename() {
        let filename = ReportService::report_filename("CS101", ReportFormat::Pdf.extension());
        assert_eq!(
            content_disposition(&filename),
            "attachment; filename=\"CS101_grades.pdf\""
        );
    }

    #[test]
    fn test_formats_have_matching_content_types() {
        assert_eq!(ReportFormat::Pdf.content_type(), "application/pdf");
        assert!(ReportFormat::Csv.content_type().starts_with("text/csv"));
    }
}
