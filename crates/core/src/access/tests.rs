//! Tests for role resolution and permission guards.

use edupace_shared::types::{BoardMemberId, CourseId, StudentId, TeacherId, UserId};
use proptest::prelude::*;
use rstest::rstest;

use super::*;

fn teacher_profile(courses: &[CourseId]) -> TeacherProfile {
    TeacherProfile {
        id: TeacherId::new(),
        employee_id: "EMP-001".to_string(),
        course_ids: courses.iter().copied().collect(),
    }
}

fn student_profile(courses: &[CourseId]) -> StudentProfile {
    StudentProfile {
        id: StudentId::new(),
        student_id: "STU001".to_string(),
        course_ids: courses.iter().copied().collect(),
    }
}

fn board_profile() -> BoardMemberProfile {
    BoardMemberProfile {
        id: BoardMemberId::new(),
        employee_id: "BRD-001".to_string(),
    }
}

fn teacher(courses: &[CourseId]) -> Principal {
    Principal::authenticated(
        UserId::new(),
        ProfileSet {
            teacher: Some(teacher_profile(courses)),
            ..ProfileSet::default()
        },
    )
}

fn student(courses: &[CourseId]) -> Principal {
    Principal::authenticated(
        UserId::new(),
        ProfileSet {
            student: Some(student_profile(courses)),
            ..ProfileSet::default()
        },
    )
}

fn board() -> Principal {
    Principal::authenticated(
        UserId::new(),
        ProfileSet {
            academic_board: Some(board_profile()),
            ..ProfileSet::default()
        },
    )
}

fn no_profile() -> Principal {
    Principal::authenticated(UserId::new(), ProfileSet::default())
}

// ============================================================================
// Role resolution
// ============================================================================

#[test]
fn test_resolve_each_single_profile() {
    assert_eq!(teacher(&[]).kind(), RoleKind::Teacher);
    assert_eq!(student(&[]).kind(), RoleKind::Student);
    assert_eq!(board().kind(), RoleKind::AcademicBoard);
    assert_eq!(no_profile().kind(), RoleKind::None);
}

#[test]
fn test_anonymous_resolves_to_none() {
    let principal = Principal::anonymous();
    assert!(!principal.is_authenticated());
    assert_eq!(principal.role, Role::None);
}

#[test]
fn test_multiple_profiles_prefer_teacher_then_student() {
    let all = ProfileSet {
        teacher: Some(teacher_profile(&[])),
        student: Some(student_profile(&[])),
        academic_board: Some(board_profile()),
    };
    assert_eq!(resolve_role(UserId::new(), all).kind(), RoleKind::Teacher);

    let student_and_board = ProfileSet {
        teacher: None,
        student: Some(student_profile(&[])),
        academic_board: Some(board_profile()),
    };
    assert_eq!(
        resolve_role(UserId::new(), student_and_board).kind(),
        RoleKind::Student
    );
}

#[rstest]
#[case("student", RoleKind::Student)]
#[case("teacher", RoleKind::Teacher)]
#[case("academic_board", RoleKind::AcademicBoard)]
#[case(" Teacher ", RoleKind::Teacher)]
fn test_role_kind_parse(#[case] input: &str, #[case] expected: RoleKind) {
    assert_eq!(input.parse::<RoleKind>().unwrap(), expected);
}

#[test]
fn test_role_kind_parse_rejects_unknown() {
    assert!("admin".parse::<RoleKind>().is_err());
    assert!("none".parse::<RoleKind>().is_err());
}

// ============================================================================
// Guards
// ============================================================================

#[test]
fn test_board_edits_unlocked_course() {
    let course = CourseState::new(CourseId::new(), false);
    let principal = board();

    assert!(can_edit_course(&principal, &course));
    assert!(can_modify_program_outcome(&principal, &course));
    assert!(can_assign_teacher(&principal, &course));
    assert!(can_delete_course(&principal, &course));
    assert!(can_toggle_lock(&principal, &course));
    assert!(can_create_course(&principal));
}

#[test]
fn test_board_blocked_by_lock_except_toggle() {
    let course = CourseState::new(CourseId::new(), true);
    let principal = board();

    assert_eq!(
        require_edit_course(&principal, &course),
        Err(PermissionError::CourseLocked)
    );
    assert!(!can_modify_program_outcome(&principal, &course));
    assert!(!can_assign_teacher(&principal, &course));
    assert!(!can_delete_course(&principal, &course));
    assert!(can_toggle_lock(&principal, &course));
    assert!(can_view_course(&principal, &course));
}

#[test]
fn test_teacher_needs_assignment_for_learning_outcomes() {
    let course = CourseState::new(CourseId::new(), false);

    assert!(can_modify_learning_outcome(&teacher(&[course.id]), &course));
    assert_eq!(
        require_modify_learning_outcome(&teacher(&[CourseId::new()]), &course),
        Err(PermissionError::NotAssigned)
    );
}

#[test]
fn test_teacher_upload_blocked_by_lock() {
    let course = CourseState::new(CourseId::new(), true);
    let principal = teacher(&[course.id]);

    assert_eq!(
        require_upload_grades(&principal, &course),
        Err(PermissionError::CourseLocked)
    );
    assert!(can_export_grades(&principal, &course));
}

#[test]
fn test_role_checked_before_lock() {
    let course = CourseState::new(CourseId::new(), true);

    assert_eq!(
        require_upload_grades(&board(), &course),
        Err(PermissionError::WrongRole {
            required: RoleKind::Teacher
        })
    );
    assert_eq!(
        require_edit_course(&teacher(&[course.id]), &course),
        Err(PermissionError::WrongRole {
            required: RoleKind::AcademicBoard
        })
    );
}

#[test]
fn test_unassigned_checked_before_lock() {
    let course = CourseState::new(CourseId::new(), true);
    assert_eq!(
        require_upload_grades(&teacher(&[]), &course),
        Err(PermissionError::NotAssigned)
    );
}

#[test]
fn test_anonymous_is_unauthenticated() {
    let course = CourseState::new(CourseId::new(), false);
    let anon = Principal::anonymous();

    assert_eq!(
        require_view_course(&anon, &course),
        Err(PermissionError::Unauthenticated)
    );
    assert_eq!(
        require_create_course(&anon),
        Err(PermissionError::Unauthenticated)
    );
    assert_eq!(
        require_upload_grades(&anon, &course),
        Err(PermissionError::Unauthenticated)
    );
}

#[test]
fn test_view_course_by_membership() {
    let course = CourseState::new(CourseId::new(), false);

    assert!(can_view_course(&student(&[course.id]), &course));
    assert_eq!(
        require_view_course(&student(&[]), &course),
        Err(PermissionError::NotEnrolled)
    );
    assert!(can_view_course(&teacher(&[course.id]), &course));
    assert_eq!(
        require_view_course(&teacher(&[]), &course),
        Err(PermissionError::NotAssigned)
    );
    assert!(!can_view_course(&no_profile(), &course));
}

#[test]
fn test_students_never_mutate() {
    let course = CourseState::new(CourseId::new(), false);
    let principal = student(&[course.id]);

    assert!(!can_edit_course(&principal, &course));
    assert!(!can_upload_grades(&principal, &course));
    assert!(!can_modify_learning_outcome(&principal, &course));
    assert!(!can_toggle_lock(&principal, &course));
    assert!(!can_export_grades(&principal, &course));
}

#[test]
fn test_permission_error_messages() {
    assert_eq!(
        PermissionError::WrongRole {
            required: RoleKind::Teacher
        }
        .to_string(),
        "Only a Teacher may perform this action."
    );
    assert_eq!(PermissionError::CourseLocked.code(), "course_locked");
}

// ============================================================================
// Properties
// ============================================================================

fn principal_strategy(course: CourseId) -> impl Strategy<Value = Principal> {
    (0u8..5, any::<bool>()).prop_map(move |(kind, member)| {
        let courses = if member { vec![course] } else { Vec::new() };
        match kind {
            0 => teacher(&courses),
            1 => student(&courses),
            2 => board(),
            3 => no_profile(),
            _ => Principal::anonymous(),
        }
    })
}

proptest! {
    /// Locked courses reject every mutating check for every role.
    #[test]
    fn prop_locked_course_rejects_all_mutations(
        principal in principal_strategy(CourseId::from_uuid(uuid::Uuid::nil())),
    ) {
        let course = CourseState::new(CourseId::from_uuid(uuid::Uuid::nil()), true);

        prop_assert!(!can_edit_course(&principal, &course));
        prop_assert!(!can_modify_program_outcome(&principal, &course));
        prop_assert!(!can_assign_teacher(&principal, &course));
        prop_assert!(!can_delete_course(&principal, &course));
        prop_assert!(!can_modify_learning_outcome(&principal, &course));
        prop_assert!(!can_upload_grades(&principal, &course));
    }

    /// Every caller resolves to exactly one role and guards agree with predicates.
    #[test]
    fn prop_guards_match_predicates(
        principal in principal_strategy(CourseId::from_uuid(uuid::Uuid::nil())),
        locked in any::<bool>(),
    ) {
        let course = CourseState::new(CourseId::from_uuid(uuid::Uuid::nil()), locked);

        prop_assert_eq!(
            can_upload_grades(&principal, &course),
            require_upload_grades(&principal, &course).is_ok()
        );
        prop_assert_eq!(
            can_view_course(&principal, &course),
            require_view_course(&principal, &course).is_ok()
        );
        let mutating_roles = [
            can_edit_course(&principal, &course),
            can_upload_grades(&principal, &course),
        ];
        // No single caller can mutate both as board and as teacher.
        prop_assert!(!(mutating_roles[0] && mutating_roles[1]));
    }
}
