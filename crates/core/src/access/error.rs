//! Permission error types.

use thiserror::Error;

use super::role::RoleKind;

/// Reason a guard denied an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// No valid credentials were presented.
    #[error("Authentication required.")]
    Unauthenticated,

    /// The caller acts under a different role.
    #[error("Only a {} may perform this action.", required.label())]
    WrongRole {
        /// Role the action requires.
        required: RoleKind,
    },

    /// Teacher is not assigned to the course.
    #[error("You are not assigned to this course.")]
    NotAssigned,

    /// Student is not enrolled in the course.
    #[error("You are not enrolled in this course.")]
    NotEnrolled,

    /// Course is locked against modification.
    #[error("This course is locked and cannot be modified.")]
    CourseLocked,
}

impl PermissionError {
    /// Machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::WrongRole { .. } => "wrong_role",
            Self::NotAssigned => "not_assigned",
            Self::NotEnrolled => "not_enrolled",
            Self::CourseLocked => "course_locked",
        }
    }
}
