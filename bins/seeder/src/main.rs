//! Database seeder for Edupace development and testing.
//!
//! Seeds a small faculty: three courses, one academic board member, two
//! teachers and five enrolled students. Every account shares one password,
//! taken from `SEED_PASSWORD` (default `password123`).
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use edupace_core::auth::hash_password;
use edupace_core::course::CourseDraft;
use edupace_db::{
    CourseRepository, ProfileRepository, UserRepository,
    repositories::{NewBoardMember, NewStudent, NewTeacher, NewUser},
};

const DEFAULT_PASSWORD: &str = "password123";

/// (code, name, credits)
const COURSES: [(&str, &str, i16); 3] = [
    ("CS101", "Introduction to Programming", 3),
    ("CS201", "Data Structures", 4),
    ("MATH101", "Calculus I", 3),
];

/// (username, first, last, employee id, course codes)
const TEACHERS: [(&str, &str, &str, &str, &[&str]); 2] = [
    ("tsmith", "Tom", "Smith", "T-1001", &["CS101", "CS201"]),
    ("tjones", "Tara", "Jones", "T-1002", &["MATH101"]),
];

/// (username, first, last, student id)
const STUDENTS: [(&str, &str, &str, &str); 5] = [
    ("alice", "Alice", "Ahmed", "S-2024-001"),
    ("bilal", "Bilal", "Khan", "S-2024-002"),
    ("chen", "Chen", "Wei", "S-2024-003"),
    ("dana", "Dana", "Ortiz", "S-2024-004"),
    ("emre", "Emre", "Yilmaz", "S-2024-005"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;
    let password =
        std::env::var("SEED_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());

    println!("Connecting to database...");
    let db = edupace_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    if UserRepository::new(db.clone()).username_exists("board").await? {
        println!("Seed data already present, skipping...");
        return Ok(());
    }

    let password_hash = hash_password(&password)?;

    println!("Seeding courses...");
    let courses = seed_courses(&db).await?;

    println!("Seeding academic board member...");
    seed_board_member(&db, &password_hash).await?;

    println!("Seeding teachers...");
    seed_teachers(&db, &password_hash, &courses).await?;

    println!("Seeding students...");
    seed_students(&db, &password_hash, &courses).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Creates the courses and returns `(code, id)` pairs.
async fn seed_courses(db: &DatabaseConnection) -> anyhow::Result<Vec<(&'static str, Uuid)>> {
    let repo = CourseRepository::new(db.clone());
    let mut created = Vec::with_capacity(COURSES.len());

    for (code, name, credits) in COURSES {
        let draft = CourseDraft {
            code: code.to_string(),
            name: name.to_string(),
            description: String::new(),
            credits,
        }
        .validated()?;
        let course = repo.create(draft).await?;
        println!("  Created course {code}");
        created.push((code, course.id));
    }

    Ok(created)
}

fn course_id(courses: &[(&'static str, Uuid)], code: &str) -> anyhow::Result<Uuid> {
    courses
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, id)| *id)
        .with_context(|| format!("Unknown course code {code}"))
}

async fn create_user(
    db: &DatabaseConnection,
    password_hash: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<Uuid> {
    let user = UserRepository::new(db.clone())
        .create(NewUser {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{username}@edupace.dev"),
        })
        .await?;
    Ok(user.id)
}

async fn seed_board_member(db: &DatabaseConnection, password_hash: &str) -> anyhow::Result<()> {
    let user_id = create_user(db, password_hash, "board", "Bea", "Board").await?;
    ProfileRepository::new(db.clone())
        .create_board_member(NewBoardMember {
            user_id,
            employee_id: "B-0001".to_string(),
            designation: "Dean".to_string(),
        })
        .await?;
    println!("  Created board member board");
    Ok(())
}

async fn seed_teachers(
    db: &DatabaseConnection,
    password_hash: &str,
    courses: &[(&'static str, Uuid)],
) -> anyhow::Result<()> {
    let profiles = ProfileRepository::new(db.clone());
    let course_repo = CourseRepository::new(db.clone());

    for (username, first, last, employee_id, codes) in TEACHERS {
        let user_id = create_user(db, password_hash, username, first, last).await?;
        let teacher = profiles
            .create_teacher(NewTeacher {
                user_id,
                employee_id: employee_id.to_string(),
                department: "Computing".to_string(),
            })
            .await?;

        for code in codes {
            course_repo
                .assign_teacher(course_id(courses, code)?, teacher.id)
                .await?;
        }
        println!("  Created teacher {username} ({} courses)", codes.len());
    }

    Ok(())
}

async fn seed_students(
    db: &DatabaseConnection,
    password_hash: &str,
    courses: &[(&'static str, Uuid)],
) -> anyhow::Result<()> {
    let profiles = ProfileRepository::new(db.clone());
    let enrollment_date =
        NaiveDate::from_ymd_opt(2024, 9, 1).context("Invalid enrollment date")?;

    for (username, first, last, student_id) in STUDENTS {
        let user_id = create_user(db, password_hash, username, first, last).await?;
        let student = profiles
            .create_student(NewStudent {
                user_id,
                student_id: student_id.to_string(),
                enrollment_date,
                program: "BSc Computer Science".to_string(),
            })
            .await?;

        for (_, course) in courses {
            profiles.enroll_student(student.id, *course).await?;
        }
        println!("  Created student {username}");
    }

    Ok(())
}
