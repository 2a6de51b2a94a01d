//! Entity re-exports.

pub use super::academic_board_members::Entity as AcademicBoardMembers;
pub use super::course_outcomes::Entity as CourseOutcomes;
pub use super::courses::Entity as Courses;
pub use super::grades::Entity as Grades;
pub use super::student_courses::Entity as StudentCourses;
pub use super::students::Entity as Students;
pub use super::teacher_courses::Entity as TeacherCourses;
pub use super::teachers::Entity as Teachers;
pub use super::users::Entity as Users;
