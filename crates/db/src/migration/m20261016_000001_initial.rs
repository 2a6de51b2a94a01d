//! Initial database migration.
//!
//! Creates identity, profile, course, outcome and grade tables plus the
//! triggers that keep `updated_at` current and protect locked courses.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: IDENTITY & PROFILES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PROFILES_SQL).await?;

        // ============================================================
        // PART 3: COURSES & MEMBERSHIP
        // ============================================================
        db.execute_unprepared(COURSES_SQL).await?;
        db.execute_unprepared(MEMBERSHIP_SQL).await?;

        // ============================================================
        // PART 4: OUTCOMES & GRADES
        // ============================================================
        db.execute_unprepared(OUTCOMES_SQL).await?;
        db.execute_unprepared(GRADES_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE outcome_kind AS ENUM ('program', 'learning');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(150) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    first_name VARCHAR(150) NOT NULL DEFAULT '',
    last_name VARCHAR(150) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL DEFAULT '',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PROFILES_SQL: &str = r"
CREATE TABLE teachers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    employee_id VARCHAR(50) NOT NULL UNIQUE,
    department VARCHAR(100) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE students (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    student_id VARCHAR(50) NOT NULL UNIQUE,
    enrollment_date DATE NOT NULL DEFAULT CURRENT_DATE,
    program VARCHAR(100) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE academic_board_members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    employee_id VARCHAR(50) NOT NULL UNIQUE,
    designation VARCHAR(100) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const COURSES_SQL: &str = r"
CREATE TABLE courses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(200) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    credits SMALLINT NOT NULL DEFAULT 3,
    is_locked BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_course_credits CHECK (credits BETWEEN 1 AND 10),
    CONSTRAINT chk_course_code CHECK (length(trim(code)) > 0)
);
";

const MEMBERSHIP_SQL: &str = r"
CREATE TABLE teacher_courses (
    teacher_id UUID NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    PRIMARY KEY (teacher_id, course_id)
);

CREATE INDEX idx_teacher_courses_course ON teacher_courses(course_id);

CREATE TABLE student_courses (
    student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    PRIMARY KEY (student_id, course_id)
);

CREATE INDEX idx_student_courses_course ON student_courses(course_id);
";

const OUTCOMES_SQL: &str = r"
CREATE TABLE course_outcomes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    kind outcome_kind NOT NULL,
    code VARCHAR(20) NOT NULL,
    description TEXT NOT NULL,
    created_by UUID REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_course_outcome_code UNIQUE (course_id, kind, code)
);
";

const GRADES_SQL: &str = r"
CREATE TABLE grades (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    student_id UUID NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    grade VARCHAR(2) NOT NULL,
    percentage NUMERIC(5, 2),
    semester VARCHAR(20) NOT NULL DEFAULT '',
    academic_year VARCHAR(20) NOT NULL DEFAULT '',
    created_by UUID REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_grade_term UNIQUE (student_id, course_id, semester, academic_year),
    CONSTRAINT chk_grade_letter CHECK (
        grade IN ('A+', 'A', 'A-', 'B+', 'B', 'B-', 'C+', 'C', 'C-', 'D', 'F')
    ),
    CONSTRAINT chk_grade_percentage CHECK (percentage IS NULL OR percentage BETWEEN 0 AND 100)
);

CREATE INDEX idx_grades_course ON grades(course_id, academic_year DESC, semester DESC);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: touch_updated_at
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_courses_updated_at BEFORE UPDATE ON courses
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_course_outcomes_updated_at BEFORE UPDATE ON course_outcomes
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_grades_updated_at BEFORE UPDATE ON grades
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

-- ============================================================
-- FUNCTION: reject_locked_course_write
-- Grades and outcomes of a locked course are read-only
-- ============================================================
CREATE OR REPLACE FUNCTION reject_locked_course_write()
RETURNS TRIGGER AS $$
DECLARE
    target_course UUID;
BEGIN
    IF TG_OP = 'DELETE' THEN
        target_course := OLD.course_id;
    ELSE
        target_course := NEW.course_id;
    END IF;

    IF EXISTS (SELECT 1 FROM courses WHERE id = target_course AND is_locked) THEN
        RAISE EXCEPTION 'Course % is locked', target_course;
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_grades_locked
BEFORE INSERT OR UPDATE OR DELETE ON grades
FOR EACH ROW
WHEN (pg_trigger_depth() = 0)
EXECUTE FUNCTION reject_locked_course_write();

CREATE TRIGGER trg_course_outcomes_locked
BEFORE INSERT OR UPDATE OR DELETE ON course_outcomes
FOR EACH ROW
WHEN (pg_trigger_depth() = 0)
EXECUTE FUNCTION reject_locked_course_write();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS grades CASCADE;
DROP TABLE IF EXISTS course_outcomes CASCADE;
DROP TABLE IF EXISTS student_courses CASCADE;
DROP TABLE IF EXISTS teacher_courses CASCADE;
DROP TABLE IF EXISTS courses CASCADE;
DROP TABLE IF EXISTS academic_board_members CASCADE;
DROP TABLE IF EXISTS students CASCADE;
DROP TABLE IF EXISTS teachers CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS reject_locked_course_write();
DROP FUNCTION IF EXISTS touch_updated_at();
DROP TYPE IF EXISTS outcome_kind;
";
