//! Permission predicates and guards.
//!
//! Every guard checks, in order: authentication, role, course membership,
//! then the course lock. The `can_*` predicates are the boolean form of the
//! matching `require_*` guard.

use edupace_shared::types::CourseId;
use serde::{Deserialize, Serialize};

use super::error::PermissionError;
use super::role::{Principal, Role, RoleKind};

/// The part of a course the permission rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseState {
    /// Course ID.
    pub id: CourseId,
    /// Whether the course is locked against modification.
    pub is_locked: bool,
}

impl CourseState {
    /// Creates a course state.
    #[must_use]
    pub const fn new(id: CourseId, is_locked: bool) -> Self {
        Self { id, is_locked }
    }
}

fn require_authenticated(principal: &Principal) -> Result<(), PermissionError> {
    if principal.is_authenticated() {
        Ok(())
    } else {
        Err(PermissionError::Unauthenticated)
    }
}

fn require_board(principal: &Principal) -> Result<(), PermissionError> {
    require_authenticated(principal)?;
    match principal.role {
        Role::AcademicBoard(_) => Ok(()),
        _ => Err(PermissionError::WrongRole {
            required: RoleKind::AcademicBoard,
        }),
    }
}

fn require_assigned_teacher(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_authenticated(principal)?;
    match &principal.role {
        Role::Teacher(teacher) if teacher.course_ids.contains(&course.id) => Ok(()),
        Role::Teacher(_) => Err(PermissionError::NotAssigned),
        _ => Err(PermissionError::WrongRole {
            required: RoleKind::Teacher,
        }),
    }
}

const fn require_unlocked(course: &CourseState) -> Result<(), PermissionError> {
    if course.is_locked {
        Err(PermissionError::CourseLocked)
    } else {
        Ok(())
    }
}

/// Board members may edit course fields while the course is unlocked.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_edit_course(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_board(principal)?;
    require_unlocked(course)
}

/// Program outcomes follow the course-edit rule.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_modify_program_outcome(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_edit_course(principal, course)
}

/// Teacher assignment follows the course-edit rule.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_assign_teacher(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_edit_course(principal, course)
}

/// Course deletion follows the course-edit rule.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_delete_course(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_edit_course(principal, course)
}

/// Assigned teachers may change learning outcomes while the course is unlocked.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_modify_learning_outcome(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_assigned_teacher(principal, course)?;
    require_unlocked(course)
}

/// Grade upload and manual entry share the learning-outcome rule.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_upload_grades(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_modify_learning_outcome(principal, course)
}

/// Only board members toggle the lock; the lock state itself is not checked.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_toggle_lock(
    principal: &Principal,
    _course: &CourseState,
) -> Result<(), PermissionError> {
    require_board(principal)
}

/// Only board members create courses.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_create_course(principal: &Principal) -> Result<(), PermissionError> {
    require_board(principal)
}

/// Board members see every course, teachers their assigned ones and
/// students their enrolled ones.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_view_course(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_authenticated(principal)?;
    match &principal.role {
        Role::AcademicBoard(_) => Ok(()),
        Role::Teacher(teacher) if teacher.course_ids.contains(&course.id) => Ok(()),
        Role::Teacher(_) => Err(PermissionError::NotAssigned),
        Role::Student(student) if student.course_ids.contains(&course.id) => Ok(()),
        Role::Student(_) => Err(PermissionError::NotEnrolled),
        Role::None => Err(PermissionError::WrongRole {
            required: RoleKind::AcademicBoard,
        }),
    }
}

/// Assigned teachers may export grades; exporting is a read and ignores the lock.
///
/// # Errors
///
/// Returns the first failing check.
pub fn require_export_grades(
    principal: &Principal,
    course: &CourseState,
) -> Result<(), PermissionError> {
    require_assigned_teacher(principal, course)
}

/// Boolean form of [`require_edit_course`].
#[must_use]
pub fn can_edit_course(principal: &Principal, course: &CourseState) -> bool {
    require_edit_course(principal, course).is_ok()
}

/// Boolean form of [`require_modify_program_outcome`].
#[must_use]
pub fn can_modify_program_outcome(principal: &Principal, course: &CourseState) -> bool {
    require_modify_program_outcome(principal, course).is_ok()
}

/// Boolean form of [`require_assign_teacher`].
#[must_use]
pub fn can_assign_teacher(principal: &Principal, course: &CourseState) -> bool {
    require_assign_teacher(principal, course).is_ok()
}

/// Boolean form of [`require_delete_course`].
#[must_use]
pub fn can_delete_course(principal: &Principal, course: &CourseState) -> bool {
    require_delete_course(principal, course).is_ok()
}

/// Boolean form of [`require_modify_learning_outcome`].
#[must_use]
pub fn can_modify_learning_outcome(principal: &Principal, course: &CourseState) -> bool {
    require_modify_learning_outcome(principal, course).is_ok()
}

/// Boolean form of [`require_upload_grades`].
#[must_use]
pub fn can_upload_grades(principal: &Principal, course: &CourseState) -> bool {
    require_upload_grades(principal, course).is_ok()
}

/// Boolean form of [`require_toggle_lock`].
#[must_use]
pub fn can_toggle_lock(principal: &Principal, course: &CourseState) -> bool {
    require_toggle_lock(principal, course).is_ok()
}

/// Boolean form of [`require_create_course`].
#[must_use]
pub fn can_create_course(principal: &Principal) -> bool {
    require_create_course(principal).is_ok()
}

/// Boolean form of [`require_view_course`].
#[must_use]
pub fn can_view_course(principal: &Principal, course: &CourseState) -> bool {
    require_view_course(principal, course).is_ok()
}

/// Boolean form of [`require_export_grades`].
#[must_use]
pub fn can_export_grades(principal: &Principal, course: &CourseState) -> bool {
    require_export_grades(principal, course).is_ok()
}
