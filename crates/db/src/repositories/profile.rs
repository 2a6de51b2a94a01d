//! Profile repository: teacher, student and academic board records.
//!
//! Loading profiles here is what the request principal is resolved from.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::entities::{
    academic_board_members, student_courses, students, teacher_courses, teachers, users,
};
use edupace_core::access::{BoardMemberProfile, ProfileSet, StudentProfile, TeacherProfile};
use edupace_shared::types::{BoardMemberId, CourseId, StudentId, TeacherId};

/// Fields for a new teacher profile.
#[derive(Debug, Clone)]
pub struct NewTeacher {
    /// Owning account.
    pub user_id: Uuid,
    /// Unique employee identifier.
    pub employee_id: String,
    /// Department name.
    pub department: String,
}

/// Fields for a new student profile.
#[derive(Debug, Clone)]
pub struct NewStudent {
    /// Owning account.
    pub user_id: Uuid,
    /// Unique external student identifier.
    pub student_id: String,
    /// Enrollment date.
    pub enrollment_date: NaiveDate,
    /// Degree program.
    pub program: String,
}

/// Fields for a new academic board profile.
#[derive(Debug, Clone)]
pub struct NewBoardMember {
    /// Owning account.
    pub user_id: Uuid,
    /// Unique employee identifier.
    pub employee_id: String,
    /// Role on the board.
    pub designation: String,
}

/// A student with account details, as listed for a course.
#[derive(Debug, Clone)]
pub struct StudentSummary {
    /// Student profile.
    pub student: students::Model,
    /// Owning account.
    pub user: Option<users::Model>,
}

/// A teacher with account details, as listed for a course.
#[derive(Debug, Clone)]
pub struct TeacherSummary {
    /// Teacher profile.
    pub teacher: teachers::Model,
    /// Owning account.
    pub user: Option<users::Model>,
}

/// Profile repository.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads every profile attached to an account, with course memberships.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_profiles(&self, user_id: Uuid) -> Result<ProfileSet, DbErr> {
        let teacher = teachers::Entity::find()
            .filter(teachers::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        let student = students::Entity::find()
            .filter(students::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        let board = academic_board_members::Entity::find()
            .filter(academic_board_members::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let teacher = match teacher {
            Some(t) => Some(TeacherProfile {
                course_ids: self.teacher_course_ids(t.id).await?,
                id: TeacherId::from_uuid(t.id),
                employee_id: t.employee_id,
            }),
            None => None,
        };
        let student = match student {
            Some(s) => Some(StudentProfile {
                course_ids: self.student_course_ids(s.id).await?,
                id: StudentId::from_uuid(s.id),
                student_id: s.student_id,
            }),
            None => None,
        };

        Ok(ProfileSet {
            teacher,
            student,
            academic_board: board.map(|b| BoardMemberProfile {
                id: BoardMemberId::from_uuid(b.id),
                employee_id: b.employee_id,
            }),
        })
    }

    async fn teacher_course_ids(&self, teacher_id: Uuid) -> Result<BTreeSet<CourseId>, DbErr> {
        let ids: Vec<Uuid> = teacher_courses::Entity::find()
            .select_only()
            .column(teacher_courses::Column::CourseId)
            .filter(teacher_courses::Column::TeacherId.eq(teacher_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids.into_iter().map(CourseId::from_uuid).collect())
    }

    async fn student_course_ids(&self, student_id: Uuid) -> Result<BTreeSet<CourseId>, DbErr> {
        let ids: Vec<Uuid> = student_courses::Entity::find()
            .select_only()
            .column(student_courses::Column::CourseId)
            .filter(student_courses::Column::StudentId.eq(student_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids.into_iter().map(CourseId::from_uuid).collect())
    }

    /// Finds a teacher profile by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_teacher(&self, id: Uuid) -> Result<Option<teachers::Model>, DbErr> {
        teachers::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a teacher profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_teacher(&self, input: NewTeacher) -> Result<teachers::Model, DbErr> {
        teachers::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            employee_id: Set(input.employee_id),
            department: Set(input.department),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Creates a student profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_student(&self, input: NewStudent) -> Result<students::Model, DbErr> {
        students::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            student_id: Set(input.student_id),
            enrollment_date: Set(input.enrollment_date),
            program: Set(input.program),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Creates an academic board profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_board_member(
        &self,
        input: NewBoardMember,
    ) -> Result<academic_board_members::Model, DbErr> {
        academic_board_members::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            employee_id: Set(input.employee_id),
            designation: Set(input.designation),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Enrolls a student in a course. Enrolling twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn enroll_student(&self, student_id: Uuid, course_id: Uuid) -> Result<(), DbErr> {
        let membership = student_courses::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
        };
        student_courses::Entity::insert(membership)
            .on_conflict(
                OnConflict::columns([
                    student_courses::Column::StudentId,
                    student_courses::Column::CourseId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Lists students enrolled in a course, ordered by student identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn students_in_course(&self, course_id: Uuid) -> Result<Vec<StudentSummary>, DbErr> {
        let student_ids: Vec<Uuid> = student_courses::Entity::find()
            .select_only()
            .column(student_courses::Column::StudentId)
            .filter(student_courses::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let rows = students::Entity::find()
            .filter(students::Column::Id.is_in(student_ids))
            .find_also_related(users::Entity)
            .order_by_asc(students::Column::StudentId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(student, user)| StudentSummary { student, user })
            .collect())
    }

    /// Lists teachers assigned to a course, ordered by employee identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn teachers_in_course(&self, course_id: Uuid) -> Result<Vec<TeacherSummary>, DbErr> {
        let teacher_ids: Vec<Uuid> = teacher_courses::Entity::find()
            .select_only()
            .column(teacher_courses::Column::TeacherId)
            .filter(teacher_courses::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let rows = teachers::Entity::find()
            .filter(teachers::Column::Id.is_in(teacher_ids))
            .find_also_related(users::Entity)
            .order_by_asc(teachers::Column::EmployeeId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(teacher, user)| TeacherSummary { teacher, user })
            .collect())
    }
}
