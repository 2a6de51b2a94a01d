//! HTTP error responses.
//!
//! Every failure leaves a handler as `{"error": <code>, "message": <text>}`.
//! Server-side failures are logged and replaced by a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use edupace_core::access::PermissionError;
use edupace_core::course::CourseValidationError;
use edupace_core::grading::{IngestError, SheetError};
use edupace_core::reports::ReportError;
use edupace_db::{CourseError, OutcomeError};
use edupace_shared::AppError;

const GENERIC_MESSAGE: &str = "An error occurred";

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// 400 with the given code.
    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// 404 for a missing resource, e.g. `not_found("Course")`.
    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{resource} not found")).into()
    }

    /// 500 that logs `err` and hides it from the client.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        error!(error = %err, "{context}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", GENERIC_MESSAGE)
    }

    /// HTTP status of this error.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.code, "message": self.message })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(
            status,
            &err.error_code().to_ascii_lowercase(),
            err.message(),
        )
    }
}

impl From<PermissionError> for ApiError {
    fn from(err: PermissionError) -> Self {
        let status = match err {
            PermissionError::Unauthenticated => StatusCode::UNAUTHORIZED,
            _ => StatusCode::FORBIDDEN,
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::internal("Database error", err)
    }
}

impl From<CourseValidationError> for ApiError {
    fn from(err: CourseValidationError) -> Self {
        AppError::Validation(err.to_string()).into()
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::NotFound(_) => Self::not_found("Course"),
            CourseError::TeacherNotFound(_) => Self::not_found("Teacher"),
            other @ CourseError::DuplicateCode(_) => AppError::Conflict(other.to_string()).into(),
            CourseError::Database(e) => e.into(),
        }
    }
}

impl From<OutcomeError> for ApiError {
    fn from(err: OutcomeError) -> Self {
        match err {
            OutcomeError::NotFound(_) => Self::not_found("Outcome"),
            other @ OutcomeError::DuplicateCode(_) => AppError::Conflict(other.to_string()).into(),
            OutcomeError::Database(e) => e.into(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        let code = match &err {
            IngestError::Permission(p) => return (*p).into(),
            IngestError::Store(e) => return Self::internal("Grade store failed", e),
            IngestError::MissingColumns { .. } => "missing_columns",
            IngestError::Sheet(SheetError::Empty) => "empty_sheet",
            IngestError::Sheet(SheetError::Unreadable(_)) => "unreadable_sheet",
            IngestError::InvalidTarget(_) => "invalid_target",
            IngestError::InvalidEntry(_) => "invalid_entry",
        };
        Self::bad_request(code, err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::EmptyDataset => {
                Self::new(
                    StatusCode::NOT_FOUND,
                    "no_grades",
                    ReportError::EmptyDataset.to_string(),
                )
            }
            other => Self::internal("Report rendering failed", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edupace_core::access::RoleKind;
    use edupace_core::grading::GradeField;
    use rstest::rstest;

    #[rstest]
    #[case(PermissionError::Unauthenticated, StatusCode::UNAUTHORIZED)]
    #[case(PermissionError::CourseLocked, StatusCode::FORBIDDEN)]
    #[case(PermissionError::NotAssigned, StatusCode::FORBIDDEN)]
    #[case(PermissionError::NotEnrolled, StatusCode::FORBIDDEN)]
    #[case(
        PermissionError::WrongRole { required: RoleKind::Teacher },
        StatusCode::FORBIDDEN
    )]
    fn test_permission_status(#[case] err: PermissionError, #[case] status: StatusCode) {
        let api: ApiError = err.into();
        assert_eq!(api.status(), status);
        assert_eq!(api.code(), err.code());
        assert_eq!(api.message(), err.to_string());
    }

    #[test]
    fn test_missing_columns_is_bad_request() {
        let api: ApiError = IngestError::MissingColumns {
            missing: vec![GradeField::Grade],
        }
        .into();

        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.code(), "missing_columns");
        assert_eq!(api.message(), "Missing required column(s): Grade");
    }

    #[test]
    fn test_ingest_permission_keeps_forbidden() {
        let api: ApiError = IngestError::Permission(PermissionError::CourseLocked).into();
        assert_eq!(api.status(), StatusCode::FORBIDDEN);
        assert_eq!(api.code(), "course_locked");
    }

    #[test]
    fn test_empty_report_is_not_found() {
        let api: ApiError = ReportError::EmptyDataset.into();
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
        assert_eq!(api.message(), "No grades found for this course.");
    }

    #[test]
    fn test_not_found_names_resource() {
        let api = ApiError::not_found("Course");
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
        assert_eq!(api.code(), "not_found");
        assert_eq!(api.message(), "Course not found");
    }

    #[test]
    fn test_database_error_hides_details() {
        let api: ApiError = DbErr::Custom("relation does not exist".into()).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message(), GENERIC_MESSAGE);
    }

    #[test]
    fn test_duplicate_code_is_conflict() {
        let api: ApiError = CourseError::DuplicateCode("CS101".into()).into();
        assert_eq!(api.status(), StatusCode::CONFLICT);
        assert_eq!(api.code(), "conflict");
        assert_eq!(api.message(), "A course with code CS101 already exists");
    }
}
