//! Grade repository.
//!
//! Implements the ingestion store and serves the course grade listings and
//! report datasets.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, SqlErr, Statement,
    prelude::{DateTimeWithTimeZone, Decimal},
};
use tracing::warn;
use uuid::Uuid;

use crate::entities::students;
use edupace_core::auth::display_name;
use edupace_core::grading::{GradeStore, GradeUpsert, LetterGrade, StoreError, UpsertOutcome};
use edupace_core::reports::GradeReportRow;
use edupace_shared::types::StudentId;

const UPSERT_SQL: &str = r"
INSERT INTO grades (id, student_id, course_id, grade, percentage, semester, academic_year, created_by)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (student_id, course_id, semester, academic_year)
DO UPDATE SET grade = EXCLUDED.grade,
              percentage = EXCLUDED.percentage,
              created_by = EXCLUDED.created_by
RETURNING (xmax = 0) AS inserted
";

const COURSE_GRADES_SQL: &str = r"
SELECT g.id, g.student_id, s.student_id AS student_identifier,
       u.first_name, u.last_name, u.username,
       g.grade, g.percentage, g.semester, g.academic_year, g.updated_at
FROM grades g
JOIN students s ON s.id = g.student_id
JOIN users u ON u.id = s.user_id
WHERE g.course_id = $1
  AND ($2::uuid IS NULL OR g.student_id = $2)
ORDER BY g.academic_year DESC, g.semester DESC, s.student_id
";

const STUDENT_GRADES_SQL: &str = r"
SELECT c.id AS course_id, c.code AS course_code, c.name AS course_name,
       g.grade, g.percentage, g.semester, g.academic_year
FROM grades g
JOIN courses c ON c.id = g.course_id
WHERE g.student_id = $1
ORDER BY g.academic_year DESC, g.semester DESC, c.code
";

/// A student's own grade with its course, for the student dashboard.
#[derive(Debug, Clone, FromQueryResult)]
pub struct TranscriptRow {
    /// Course ID.
    pub course_id: Uuid,
    /// Course code.
    pub course_code: String,
    /// Course name.
    pub course_name: String,
    /// Letter grade text.
    pub grade: String,
    /// Optional percentage.
    pub percentage: Option<Decimal>,
    /// Semester label.
    pub semester: String,
    /// Academic year label.
    pub academic_year: String,
}

/// A grade joined with its student, as listed for a course.
#[derive(Debug, Clone, FromQueryResult)]
pub struct GradeRecord {
    /// Grade row ID.
    pub id: Uuid,
    /// Student profile ID.
    pub student_id: Uuid,
    /// External student identifier.
    pub student_identifier: String,
    /// Student given name.
    pub first_name: String,
    /// Student family name.
    pub last_name: String,
    /// Student login handle.
    pub username: String,
    /// Letter grade text.
    pub grade: String,
    /// Optional percentage.
    pub percentage: Option<Decimal>,
    /// Semester label.
    pub semester: String,
    /// Academic year label.
    pub academic_year: String,
    /// Last write time.
    pub updated_at: DateTimeWithTimeZone,
}

impl GradeRecord {
    /// Full name, falling back to the login handle.
    #[must_use]
    pub fn student_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.username)
    }
}

/// Grade repository.
#[derive(Debug, Clone)]
pub struct GradeRepository {
    db: DatabaseConnection,
}

impl GradeRepository {
    /// Creates a new grade repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a course's grades, newest term first, optionally for one student.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_course(
        &self,
        course_id: Uuid,
        student_id: Option<Uuid>,
    ) -> Result<Vec<GradeRecord>, DbErr> {
        GradeRecord::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            COURSE_GRADES_SQL,
            [course_id.into(), student_id.into()],
        ))
        .all(&self.db)
        .await
    }

    /// Lists every grade of one student across courses, newest term first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transcript(&self, student_id: Uuid) -> Result<Vec<TranscriptRow>, DbErr> {
        TranscriptRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            STUDENT_GRADES_SQL,
            [student_id.into()],
        ))
        .all(&self.db)
        .await
    }

    /// Loads the report dataset for a course.
    ///
    /// Rows whose stored letter no longer parses are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn report_rows(&self, course_id: Uuid) -> Result<Vec<GradeReportRow>, DbErr> {
        let records = self.list_for_course(course_id, None).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match record.grade.parse::<LetterGrade>() {
                Ok(grade) => Some(GradeReportRow {
                    student_name: record.student_name(),
                    student_identifier: record.student_identifier,
                    grade,
                    percentage: record.percentage,
                    semester: record.semester,
                    academic_year: record.academic_year,
                }),
                Err(e) => {
                    warn!(grade_id = %record.id, error = %e, "Skipping unreadable grade");
                    None
                }
            })
            .collect())
    }
}

fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(m) | SqlErr::ForeignKeyConstraintViolation(m)) => {
            StoreError::Conflict(m)
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

impl GradeStore for GradeRepository {
    async fn find_student_by_identifier(
        &self,
        student_identifier: &str,
    ) -> Result<Option<StudentId>, StoreError> {
        let student = students::Entity::find()
            .filter(students::Column::StudentId.eq(student_identifier))
            .one(&self.db)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(student.map(|s| StudentId::from_uuid(s.id)))
    }

    async fn upsert_grade(&self, upsert: GradeUpsert) -> Result<UpsertOutcome, StoreError> {
        let GradeUpsert {
            key,
            grade,
            percentage,
            created_by,
        } = upsert;

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                UPSERT_SQL,
                [
                    Uuid::now_v7().into(),
                    key.student_id.into_inner().into(),
                    key.course_id.into_inner().into(),
                    grade.as_str().into(),
                    percentage.into(),
                    key.semester.into(),
                    key.academic_year.into(),
                    created_by.into_inner().into(),
                ],
            ))
            .await
            .map_err(store_error)?
            .ok_or_else(|| StoreError::Backend("Upsert returned no row".to_string()))?;

        let inserted: bool = row
            .try_get("", "inserted")
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }
}
