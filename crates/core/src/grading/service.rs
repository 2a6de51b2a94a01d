//! Grade ingestion service.

use std::sync::Arc;

use edupace_shared::types::StudentId;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::columns::ColumnMap;
use super::error::{IngestError, StoreError};
use super::sheet::Sheet;
use super::types::{
    GradeKey, GradeUpsert, IngestResult, IngestTarget, LetterGrade, PercentageError, RowError,
    RowErrorKind, UpsertOutcome, parse_percentage,
};
use crate::access::{CourseState, Principal, require_upload_grades};

/// Longest accepted semester or academic year label.
pub const MAX_TERM_LABEL_LEN: usize = 20;

/// Repository trait for grade persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait GradeStore: Send + Sync {
    /// Look up a student profile by its external identifier.
    fn find_student_by_identifier(
        &self,
        student_identifier: &str,
    ) -> impl std::future::Future<Output = Result<Option<StudentId>, StoreError>> + Send;

    /// Insert or overwrite the grade at `upsert.key`.
    fn upsert_grade(
        &self,
        upsert: GradeUpsert,
    ) -> impl std::future::Future<Output = Result<UpsertOutcome, StoreError>> + Send;
}

/// One manually entered grade.
#[derive(Debug, Clone)]
pub struct ManualGradeEntry {
    /// External student identifier.
    pub student_identifier: String,
    /// Grade text, e.g. `"b+"`.
    pub grade: String,
    /// Optional percentage text.
    pub percentage: Option<String>,
}

/// Validated cells of one row, before the store is touched.
struct ParsedRow {
    student: StudentId,
    grade: LetterGrade,
    percentage: Option<Decimal>,
}

/// Grade ingestion service.
pub struct GradeIngestService<S: GradeStore> {
    store: Arc<S>,
}

impl<S: GradeStore> GradeIngestService<S> {
    /// Create a new ingestion service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Ingest an uploaded sheet into the target course and term.
    ///
    /// Structural problems (permission, missing columns, bad target) fail the
    /// whole run before any write. Row problems, store failures included, are
    /// collected and never stop the remaining rows.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The principal may not upload grades for the course
    /// - Required columns are missing
    /// - The semester or academic year label is too long
    pub async fn ingest(
        &self,
        principal: &Principal,
        course: &CourseState,
        sheet: &Sheet,
        target: &IngestTarget,
    ) -> Result<IngestResult, IngestError> {
        require_upload_grades(principal, course)?;
        validate_target(target)?;

        let columns = ColumnMap::from_headers(&sheet.headers)
            .map_err(|missing| IngestError::MissingColumns { missing })?;

        let mut result = IngestResult::default();
        for row in sheet.rows.iter().filter(|r| !r.is_blank()) {
            let student_cell = row.cell(columns.student_id);
            let percentage_cell = columns.percentage.map(|index| row.cell(index));
            let outcome = self
                .process_row(
                    row.number,
                    student_cell,
                    row.cell(columns.grade),
                    percentage_cell,
                    target,
                    &mut result,
                )
                .await;

            match outcome {
                Ok(()) => {}
                Err(IngestError::Store(e)) => {
                    warn!(row = row.number, error = %e, "grade row could not be stored");
                    let identifier = student_cell.trim();
                    result.errors.push(RowError {
                        row: row.number,
                        student_id: (!identifier.is_empty()).then(|| identifier.to_string()),
                        kind: RowErrorKind::StoreFailure(e.detail().to_string()),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            course_id = %target.course_id,
            created = result.created,
            updated = result.updated,
            errors = result.errors.len(),
            "grade sheet ingested"
        );
        Ok(result)
    }

    /// Record a single grade entered by hand.
    ///
    /// Runs the same validation as a sheet row; a rejected entry is returned
    /// as `IngestError::InvalidEntry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the principal may not upload grades, the entry is
    /// invalid, or the store fails.
    pub async fn record_grade(
        &self,
        principal: &Principal,
        course: &CourseState,
        entry: &ManualGradeEntry,
        target: &IngestTarget,
    ) -> Result<UpsertOutcome, IngestError> {
        require_upload_grades(principal, course)?;
        validate_target(target)?;

        let mut result = IngestResult::default();
        self.process_row(
            1,
            &entry.student_identifier,
            &entry.grade,
            entry.percentage.as_deref(),
            target,
            &mut result,
        )
        .await?;

        if let Some(error) = result.errors.into_iter().next() {
            return Err(IngestError::InvalidEntry(error.message()));
        }
        Ok(if result.created > 0 {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn process_row(
        &self,
        row: u32,
        student_cell: &str,
        grade_cell: &str,
        percentage_cell: Option<&str>,
        target: &IngestTarget,
        result: &mut IngestResult,
    ) -> Result<(), IngestError> {
        let parsed = match self
            .parse_row(row, student_cell, grade_cell, percentage_cell)
            .await?
        {
            Ok(parsed) => parsed,
            Err(error) => {
                result.errors.push(error);
                return Ok(());
            }
        };

        let upsert = GradeUpsert {
            key: GradeKey {
                student_id: parsed.student,
                course_id: target.course_id,
                semester: target.semester.clone(),
                academic_year: target.academic_year.clone(),
            },
            grade: parsed.grade,
            percentage: parsed.percentage,
            created_by: target.actor,
        };

        match self.store.upsert_grade(upsert).await {
            Ok(outcome) => result.record(outcome),
            Err(StoreError::Conflict(detail)) => {
                warn!(row, detail = %detail, "grade upsert conflict");
                result.errors.push(RowError {
                    row,
                    student_id: Some(student_cell.trim().to_string()),
                    kind: RowErrorKind::Conflict(detail),
                });
            }
            Err(e) => return Err(IngestError::Store(e)),
        }
        Ok(())
    }

    /// Validates cells in order: student, grade, percentage.
    ///
    /// The outer `Result` carries store failures; the inner one carries the row verdict.
    async fn parse_row(
        &self,
        row: u32,
        student_cell: &str,
        grade_cell: &str,
        percentage_cell: Option<&str>,
    ) -> Result<Result<ParsedRow, RowError>, IngestError> {
        let identifier = student_cell.trim();
        let reject = |kind| RowError {
            row,
            student_id: (!identifier.is_empty()).then(|| identifier.to_string()),
            kind,
        };

        if identifier.is_empty() {
            return Ok(Err(reject(RowErrorKind::MissingStudentId)));
        }

        let Some(student) = self
            .store
            .find_student_by_identifier(identifier)
            .await
            .map_err(IngestError::Store)?
        else {
            return Ok(Err(reject(RowErrorKind::StudentNotFound)));
        };

        let grade = match grade_cell.parse::<LetterGrade>() {
            Ok(grade) => grade,
            Err(invalid) => return Ok(Err(reject(RowErrorKind::InvalidGrade(invalid.0)))),
        };

        let percentage = match parse_percentage(percentage_cell.unwrap_or_default()) {
            Ok(percentage) => percentage,
            Err(PercentageError::Malformed(raw)) => {
                return Ok(Err(reject(RowErrorKind::InvalidPercentage(raw))));
            }
            Err(PercentageError::OutOfRange(value)) => {
                return Ok(Err(reject(RowErrorKind::PercentageOutOfRange(value))));
            }
        };

        Ok(Ok(ParsedRow {
            student,
            grade,
            percentage,
        }))
    }
}

fn validate_target(target: &IngestTarget) -> Result<(), IngestError> {
    for (label, value) in [
        ("Semester", &target.semester),
        ("Academic year", &target.academic_year),
    ] {
        if value.chars().count() > MAX_TERM_LABEL_LEN {
            return Err(IngestError::InvalidTarget(format!(
                "{label} must be at most {MAX_TERM_LABEL_LEN} characters"
            )));
        }
    }
    Ok(())
}
