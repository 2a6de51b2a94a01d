//! Role resolution from profile associations.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use edupace_shared::types::{BoardMemberId, CourseId, StudentId, TeacherId, UserId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Student profile with its enrolled courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    /// Profile ID.
    pub id: StudentId,
    /// External student identifier, as printed on rosters and spreadsheets.
    pub student_id: String,
    /// Courses the student is enrolled in.
    pub course_ids: BTreeSet<CourseId>,
}

/// Teacher profile with its assigned courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherProfile {
    /// Profile ID.
    pub id: TeacherId,
    /// Employee identifier.
    pub employee_id: String,
    /// Courses the teacher is assigned to.
    pub course_ids: BTreeSet<CourseId>,
}

/// Academic board member profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardMemberProfile {
    /// Profile ID.
    pub id: BoardMemberId,
    /// Employee identifier.
    pub employee_id: String,
}

/// The role a principal acts under. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Enrolled student.
    Student(StudentProfile),
    /// Teaching staff.
    Teacher(TeacherProfile),
    /// Academic board administrator.
    AcademicBoard(BoardMemberProfile),
    /// Anonymous, or an account without any profile.
    None,
}

impl Role {
    /// Returns the tag of this role.
    #[must_use]
    pub const fn kind(&self) -> RoleKind {
        match self {
            Self::Student(_) => RoleKind::Student,
            Self::Teacher(_) => RoleKind::Teacher,
            Self::AcademicBoard(_) => RoleKind::AcademicBoard,
            Self::None => RoleKind::None,
        }
    }
}

/// Role tag without the profile payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Student.
    Student,
    /// Teacher.
    Teacher,
    /// Academic board.
    AcademicBoard,
    /// No role.
    None,
}

impl RoleKind {
    /// Wire form used in tokens and login payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::AcademicBoard => "academic_board",
            Self::None => "none",
        }
    }

    /// Human label used in user-facing messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::AcademicBoard => "Academic Board member",
            Self::None => "user",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for RoleKind {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "academic_board" | "board" => Ok(Self::AcademicBoard),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Profiles found for one user account.
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    /// Teacher profile, if any.
    pub teacher: Option<TeacherProfile>,
    /// Student profile, if any.
    pub student: Option<StudentProfile>,
    /// Academic board profile, if any.
    pub academic_board: Option<BoardMemberProfile>,
}

impl ProfileSet {
    fn count(&self) -> usize {
        usize::from(self.teacher.is_some())
            + usize::from(self.student.is_some())
            + usize::from(self.academic_board.is_some())
    }
}

/// Derives the role from profile existence.
///
/// Teacher is checked first, then student, then academic board. An account
/// with several profiles still resolves to the first match.
#[must_use]
pub fn resolve_role(user_id: UserId, profiles: ProfileSet) -> Role {
    if profiles.count() > 1 {
        warn!(user_id = %user_id, profiles = profiles.count(), "user has more than one role profile");
    }

    if let Some(teacher) = profiles.teacher {
        Role::Teacher(teacher)
    } else if let Some(student) = profiles.student {
        Role::Student(student)
    } else if let Some(board) = profiles.academic_board {
        Role::AcademicBoard(board)
    } else {
        Role::None
    }
}

/// The authenticated (or anonymous) caller, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Account ID; `None` for anonymous callers.
    pub user_id: Option<UserId>,
    /// Resolved role.
    pub role: Role,
}

impl Principal {
    /// An unauthenticated caller.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            role: Role::None,
        }
    }

    /// An authenticated caller whose role is derived from `profiles`.
    #[must_use]
    pub fn authenticated(user_id: UserId, profiles: ProfileSet) -> Self {
        Self {
            user_id: Some(user_id),
            role: resolve_role(user_id, profiles),
        }
    }

    /// Returns true if the caller presented valid credentials.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Returns the role tag.
    #[must_use]
    pub const fn kind(&self) -> RoleKind {
        self.role.kind()
    }

    /// Returns the teacher profile when acting as a teacher.
    #[must_use]
    pub const fn teacher(&self) -> Option<&TeacherProfile> {
        match &self.role {
            Role::Teacher(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the student profile when acting as a student.
    #[must_use]
    pub const fn student(&self) -> Option<&StudentProfile> {
        match &self.role {
            Role::Student(s) => Some(s),
            _ => None,
        }
    }
}
