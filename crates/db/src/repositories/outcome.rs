//! Outcome repository for program and learning outcomes.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::{course_outcomes, sea_orm_active_enums::OutcomeKind};
use edupace_core::course::OutcomeDraft;

/// Error types for outcome operations.
#[derive(Debug, thiserror::Error)]
pub enum OutcomeError {
    /// Outcome not found.
    #[error("Outcome not found: {0}")]
    NotFound(Uuid),

    /// The course already has an outcome of this kind with this code.
    #[error("An outcome with code {0} already exists for this course")]
    DuplicateCode(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

fn map_code_conflict(err: DbErr, code: &str) -> OutcomeError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => OutcomeError::DuplicateCode(code.to_string()),
        _ => OutcomeError::Database(err),
    }
}

/// Outcome repository.
#[derive(Debug, Clone)]
pub struct OutcomeRepository {
    db: DatabaseConnection,
}

impl OutcomeRepository {
    /// Creates a new outcome repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a course's outcomes of one kind ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        course_id: Uuid,
        kind: OutcomeKind,
    ) -> Result<Vec<course_outcomes::Model>, DbErr> {
        course_outcomes::Entity::find()
            .filter(course_outcomes::Column::CourseId.eq(course_id))
            .filter(course_outcomes::Column::Kind.eq(kind))
            .order_by_asc(course_outcomes::Column::Code)
            .all(&self.db)
            .await
    }

    /// Counts how many of the given courses have at least one outcome of a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn courses_with_outcomes(
        &self,
        course_ids: &[Uuid],
        kind: OutcomeKind,
    ) -> Result<usize, DbErr> {
        if course_ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = course_outcomes::Entity::find()
            .select_only()
            .column(course_outcomes::Column::CourseId)
            .distinct()
            .filter(course_outcomes::Column::CourseId.is_in(course_ids.iter().copied()))
            .filter(course_outcomes::Column::Kind.eq(kind))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids.len())
    }

    /// Finds an outcome of the given kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        id: Uuid,
        kind: OutcomeKind,
    ) -> Result<Option<course_outcomes::Model>, DbErr> {
        course_outcomes::Entity::find_by_id(id)
            .filter(course_outcomes::Column::Kind.eq(kind))
            .one(&self.db)
            .await
    }

    /// Creates an outcome.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeError::DuplicateCode` if the code is taken in this course.
    pub async fn create(
        &self,
        course_id: Uuid,
        kind: OutcomeKind,
        draft: OutcomeDraft,
        created_by: Uuid,
    ) -> Result<course_outcomes::Model, OutcomeError> {
        let now = chrono::Utc::now().into();
        let code = draft.code.clone();
        course_outcomes::ActiveModel {
            id: Set(Uuid::now_v7()),
            course_id: Set(course_id),
            kind: Set(kind),
            code: Set(draft.code),
            description: Set(draft.description),
            created_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_code_conflict(e, &code))
    }

    /// Replaces an outcome's code and description.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeError::NotFound` or `OutcomeError::DuplicateCode`.
    pub async fn update(
        &self,
        outcome: course_outcomes::Model,
        draft: OutcomeDraft,
    ) -> Result<course_outcomes::Model, OutcomeError> {
        let code = draft.code.clone();
        let mut active: course_outcomes::ActiveModel = outcome.into();
        active.code = Set(draft.code);
        active.description = Set(draft.description);
        active.updated_at = Set(chrono::Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| map_code_conflict(e, &code))
    }

    /// Deletes an outcome.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeError::NotFound` if nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), OutcomeError> {
        let result = course_outcomes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(OutcomeError::NotFound(id));
        }
        Ok(())
    }
}
