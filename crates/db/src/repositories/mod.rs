//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod course;
pub mod grade;
pub mod outcome;
pub mod profile;
pub mod user;

pub use course::{CourseError, CourseRepository, course_state};
pub use grade::{GradeRecord, GradeRepository, TranscriptRow};
pub use outcome::{OutcomeError, OutcomeRepository};
pub use profile::{
    NewBoardMember, NewStudent, NewTeacher, ProfileRepository, StudentSummary, TeacherSummary,
};
pub use user::{NewUser, UserRepository};
