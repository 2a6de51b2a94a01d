//! Course repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::entities::{courses, teacher_courses, teachers};
use edupace_core::access::CourseState;
use edupace_core::course::CourseDraft;
use edupace_shared::types::CourseId;

/// Error types for course operations.
#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    /// Course not found.
    #[error("Course not found: {0}")]
    NotFound(Uuid),

    /// Another course already uses this code.
    #[error("A course with code {0} already exists")]
    DuplicateCode(String),

    /// Teacher profile not found.
    #[error("Teacher not found: {0}")]
    TeacherNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Maps a unique violation on `courses.code` to `DuplicateCode`.
fn map_code_conflict(err: DbErr, code: &str) -> CourseError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CourseError::DuplicateCode(code.to_string()),
        _ => CourseError::Database(err),
    }
}

/// Course repository.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    db: DatabaseConnection,
}

impl CourseRepository {
    /// Creates a new course repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every course ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<courses::Model>, DbErr> {
        courses::Entity::find()
            .order_by_asc(courses::Column::Code)
            .all(&self.db)
            .await
    }

    /// Lists the given courses ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_ids(
        &self,
        ids: impl IntoIterator<Item = CourseId>,
    ) -> Result<Vec<courses::Model>, DbErr> {
        let ids: Vec<Uuid> = ids.into_iter().map(CourseId::into_inner).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        courses::Entity::find()
            .filter(courses::Column::Id.is_in(ids))
            .order_by_asc(courses::Column::Code)
            .all(&self.db)
            .await
    }

    /// Finds a course by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<courses::Model>, DbErr> {
        courses::Entity::find_by_id(id).one(&self.db).await
    }

    /// Loads the permission-relevant state of a course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::NotFound` if the course does not exist.
    pub async fn state(&self, id: Uuid) -> Result<CourseState, CourseError> {
        let course = self.find_by_id(id).await?.ok_or(CourseError::NotFound(id))?;
        Ok(course_state(&course))
    }

    /// Creates a course from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::DuplicateCode` if the code is taken.
    pub async fn create(&self, draft: CourseDraft) -> Result<courses::Model, CourseError> {
        let now = chrono::Utc::now().into();
        let code = draft.code.clone();
        courses::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(draft.code),
            name: Set(draft.name),
            description: Set(draft.description),
            credits: Set(draft.credits),
            is_locked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_code_conflict(e, &code))
    }

    /// Replaces a course's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::NotFound` or `CourseError::DuplicateCode`.
    pub async fn update(&self, id: Uuid, draft: CourseDraft) -> Result<courses::Model, CourseError> {
        let course = self.find_by_id(id).await?.ok_or(CourseError::NotFound(id))?;
        let code = draft.code.clone();

        let mut active: courses::ActiveModel = course.into();
        active.code = Set(draft.code);
        active.name = Set(draft.name);
        active.description = Set(draft.description);
        active.credits = Set(draft.credits);
        active.updated_at = Set(chrono::Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| map_code_conflict(e, &code))
    }

    /// Sets the lock flag.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::NotFound` if the course does not exist.
    pub async fn set_locked(&self, id: Uuid, locked: bool) -> Result<courses::Model, CourseError> {
        let course = self.find_by_id(id).await?.ok_or(CourseError::NotFound(id))?;
        let mut active: courses::ActiveModel = course.into();
        active.is_locked = Set(locked);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a course with its outcomes, grades and memberships.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::NotFound` if nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), CourseError> {
        let result = courses::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(CourseError::NotFound(id));
        }
        Ok(())
    }

    /// Assigns a teacher to a course. Assigning twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::TeacherNotFound` for an unknown teacher.
    pub async fn assign_teacher(&self, course_id: Uuid, teacher_id: Uuid) -> Result<(), CourseError> {
        if teachers::Entity::find_by_id(teacher_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(CourseError::TeacherNotFound(teacher_id));
        }

        let membership = teacher_courses::ActiveModel {
            teacher_id: Set(teacher_id),
            course_id: Set(course_id),
        };
        teacher_courses::Entity::insert(membership)
            .on_conflict(
                OnConflict::columns([
                    teacher_courses::Column::TeacherId,
                    teacher_courses::Column::CourseId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Counts all courses and the locked subset.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn counts(&self) -> Result<(u64, u64), DbErr> {
        let total = courses::Entity::find().count(&self.db).await?;
        let locked = courses::Entity::find()
            .filter(courses::Column::IsLocked.eq(true))
            .count(&self.db)
            .await?;
        Ok((total, locked))
    }
}

/// Projects a course row onto the permission model.
#[must_use]
pub fn course_state(course: &courses::Model) -> CourseState {
    CourseState::new(CourseId::from_uuid(course.id), course.is_locked)
}
