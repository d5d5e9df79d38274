//! Demo data seed script
//!
//! Seeds the database with a realistic demo dataset:
//! - 6 users: 1 admin (specialist educator), 1 psychiatrist, 1 therapist,
//!   1 school staff, 2 parents
//! - 4 students with care-team assignments
//! - 1 pending collaboration request for the psychiatrist
//! - Notes, appointments and progress reports across the students
//! - 1 published course with sections and lessons, 2 activities, 3 posts
//!
//! Usage:
//!   DATABASE_URL=... DEMO_PASSWORD=Demo2024! ./seed-demo
//!
//! Environment variables:
//!   DATABASE_URL   — PostgreSQL connection string (required)
//!   DEMO_PASSWORD  — Password for all demo accounts (default: Demo2024!)

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use std::env;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let demo_password = env::var("DEMO_PASSWORD").unwrap_or_else(|_| "Demo2024!".to_string());

    println!("=== Seed Demo Data ===");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    carelink_api::db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    // 1. Clean existing demo data (order respects FKs; notifications first)
    println!("Cleaning existing data...");
    for table in [
        "notifications",
        "messages",
        "posts",
        "lesson_progress",
        "course_access_requests",
        "course_lessons",
        "course_sections",
        "courses",
        "activities",
        "notes",
        "appointments",
        "progress_reports",
        "collaboration_requests",
        "student_assignments",
        "students",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&pool)
            .await
            .with_context(|| format!("Failed to clean {table}"))?;
    }

    // 2. Hash password (cost 10 for seed speed)
    let password_hash =
        bcrypt::hash(&demo_password, 10).context("Failed to hash demo password")?;

    // 3. Insert users
    println!("Inserting users...");
    let admin_id = Uuid::new_v4();
    let psychiatrist_id = Uuid::new_v4();
    let therapist_id = Uuid::new_v4();
    let school_id = Uuid::new_v4();
    let parent1_id = Uuid::new_v4();
    let parent2_id = Uuid::new_v4();

    let users = [
        (admin_id,        "marie@carelink.demo",   "Marie",  "Tremblay", "specialist_educator", Some("Coordination"), true),
        (psychiatrist_id, "karim@carelink.demo",   "Karim",  "Haddad",   "psychiatrist",        Some("Child psychiatry"), false),
        (therapist_id,    "sofia@carelink.demo",   "Sofia",  "Moreno",   "therapist",           Some("Speech therapy"), false),
        (school_id,       "jean@carelink.demo",    "Jean",   "Leblanc",  "school_staff",        None, false),
        (parent1_id,      "nadia@carelink.demo",   "Nadia",  "Benali",   "parent",              None, false),
        (parent2_id,      "pierre@carelink.demo",  "Pierre", "Roy",      "parent",              None, false),
    ];

    for (id, email, first, last, role, specialization, is_admin) in &users {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, specialization, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(email)
        .bind(&password_hash)
        .bind(first)
        .bind(last)
        .bind(role)
        .bind(specialization)
        .bind(is_admin)
        .execute(&pool)
        .await
        .with_context(|| format!("Failed to insert user {email}"))?;
    }

    // 4. Insert students with care teams
    println!("Inserting students...");
    let mut rng = rand::thread_rng();
    let students = [
        ("Emma",  "Benali", parent1_id, vec![parent1_id, therapist_id]),
        ("Louis", "Roy",    parent2_id, vec![parent2_id, school_id]),
        ("Yasmin", "Benali", parent1_id, vec![parent1_id]),
        ("Noah",  "Gagnon", admin_id,   vec![admin_id, therapist_id, school_id]),
    ];

    let mut student_ids = Vec::new();
    for (first, last, created_by, team) in &students {
        let id = Uuid::new_v4();
        let code = format!("QC-{:06}", rng.gen_range(100_000..1_000_000));
        let birth = NaiveDate::from_ymd_opt(2014 + rng.gen_range(0..4), rng.gen_range(1..13), rng.gen_range(1..28))
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2015, 6, 15).unwrap());

        sqlx::query(
            "INSERT INTO students (id, first_name, last_name, ministry_code, date_of_birth, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(first)
        .bind(last)
        .bind(&code)
        .bind(birth)
        .bind(created_by)
        .execute(&pool)
        .await
        .with_context(|| format!("Failed to insert student {first}"))?;

        for member in team {
            sqlx::query(
                "INSERT INTO student_assignments (student_id, user_id, assigned_by)
                 VALUES ($1, $2, $3)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(member)
            .bind(created_by)
            .execute(&pool)
            .await?;
        }
        student_ids.push(id);
    }

    // 5. A pending collaboration request from the psychiatrist for Emma
    println!("Inserting collaboration request...");
    sqlx::query(
        "INSERT INTO collaboration_requests (requester_id, student_id, request_type, reason)
         VALUES ($1, $2, 'all', 'Referral from the family physician')",
    )
    .bind(psychiatrist_id)
    .bind(student_ids[0])
    .execute(&pool)
    .await?;

    // 6. Notes, appointments, progress reports
    println!("Inserting records...");
    sqlx::query(
        "INSERT INTO notes (student_id, created_by, title, content, category)
         VALUES ($1, $2, 'First session', 'Settled in quickly, responsive to visual prompts.', 'observation'),
                ($1, $2, 'Follow-up', 'Continued progress with the picture schedule.', 'observation')",
    )
    .bind(student_ids[0])
    .bind(therapist_id)
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO appointments (student_id, created_by, title, scheduled_at, duration_minutes, location)
         VALUES ($1, $2, 'Speech therapy session', $3, 45, 'Clinic room 2')",
    )
    .bind(student_ids[0])
    .bind(therapist_id)
    .bind(Utc::now() + Duration::days(3))
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO progress_reports (student_id, created_by, title, content, period)
         VALUES ($1, $2, 'Fall review', 'Vocabulary expanded from 40 to 70 words.', '2025-Q3')",
    )
    .bind(student_ids[0])
    .bind(therapist_id)
    .execute(&pool)
    .await?;

    // 7. One published course with content
    println!("Inserting course...");
    let course_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO courses (id, title, description, created_by, is_published)
         VALUES ($1, 'Supporting routines at home', 'Practical strategies for daily structure.', $2, TRUE)",
    )
    .bind(course_id)
    .bind(admin_id)
    .execute(&pool)
    .await?;

    let section_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO course_sections (id, course_id, title, position) VALUES ($1, $2, 'Getting started', 0)",
    )
    .bind(section_id)
    .bind(course_id)
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO course_lessons (section_id, title, content, position)
         VALUES ($1, 'Why routines matter', 'Predictability lowers anxiety...', 0),
                ($1, 'Building a visual schedule', 'Start with three anchor moments...', 1)",
    )
    .bind(section_id)
    .execute(&pool)
    .await?;

    // 8. Activities and posts
    println!("Inserting activities and posts...");
    sqlx::query(
        "INSERT INTO activities (title, description, category, scheduled_at, created_by)
         VALUES ('Sensory-friendly museum visit', 'Group outing, quiet hours.', 'outing', $1, $2),
                ('Parent support circle', 'Monthly discussion group.', 'community', $3, $2)",
    )
    .bind(Utc::now() + Duration::days(10))
    .bind(admin_id)
    .bind(Utc::now() + Duration::days(21))
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO posts (author_id, title, content)
         VALUES ($1, 'Welcome to the platform', 'Introduce yourself in the comments of the next meetup post.'),
                ($2, 'Great book recommendation', 'Uniquely Human gave us a new perspective.'),
                ($1, 'Holiday schedule', 'The clinic is closed December 24 to January 2.')",
    )
    .bind(admin_id)
    .bind(parent1_id)
    .execute(&pool)
    .await?;

    // 9. A message thread between a parent and the therapist
    sqlx::query(
        "INSERT INTO messages (sender_id, recipient_id, content, read)
         VALUES ($1, $2, 'Hi Sofia, how did today''s session go?', TRUE),
                ($2, $1, 'Really well! Emma used full sentences twice.', FALSE)",
    )
    .bind(parent1_id)
    .bind(therapist_id)
    .execute(&pool)
    .await?;

    println!("Done. Demo accounts use password: {demo_password}");
    println!("  admin:        marie@carelink.demo");
    println!("  psychiatrist: karim@carelink.demo");
    println!("  therapist:    sofia@carelink.demo");
    println!("  school staff: jean@carelink.demo");
    println!("  parents:      nadia@carelink.demo, pierre@carelink.demo");

    Ok(())
}
