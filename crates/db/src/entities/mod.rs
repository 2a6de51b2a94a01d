//! `SeaORM` entity definitions.

pub mod prelude;

pub mod academic_board_members;
pub mod course_outcomes;
pub mod courses;
pub mod grades;
pub mod sea_orm_active_enums;
pub mod student_courses;
pub mod students;
pub mod teacher_courses;
pub mod teachers;
pub mod users;
