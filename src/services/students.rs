use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        student::{
            AssignedUserDto, CreateStudentRequest, Student, StudentWithTeam, UpdateStudentRequest,
        },
    },
    services::notifications::{self, NotificationService},
};

pub struct StudentService;

impl StudentService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students ORDER BY last_name, first_name",
        )
        .fetch_all(pool)
        .await?;
        Ok(students)
    }

    /// Students the user is assigned to or created.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT DISTINCT s.* FROM students s
             LEFT JOIN student_assignments sa ON sa.student_id = s.id
             WHERE sa.user_id = $1 OR s.created_by = $1
             ORDER BY s.last_name, s.first_name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(students)
    }

    /// Create a student; the creator becomes the first assigned user.
    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        req: &CreateStudentRequest,
    ) -> Result<Student, AppError> {
        let mut tx = pool.begin().await?;
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (first_name, last_name, ministry_code, date_of_birth, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.ministry_code)
        .bind(req.date_of_birth)
        .bind(actor.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error().and_then(|db| db.constraint()) {
            Some("students_ministry_code_key") => {
                AppError::Conflict("A student with this ministry code already exists".into())
            }
            _ => AppError::Database(e),
        })?;

        sqlx::query(
            "INSERT INTO student_assignments (student_id, user_id, assigned_by)
             VALUES ($1, $2, $2)",
        )
        .bind(student.id)
        .bind(actor.user_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(student)
    }

    pub async fn get_with_team(pool: &PgPool, student_id: Uuid) -> Result<StudentWithTeam, AppError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".into()))?;

        let assigned_users = Self::team(pool, student_id).await?;
        Ok(StudentWithTeam {
            student,
            assigned_users,
        })
    }

    pub async fn team(pool: &PgPool, student_id: Uuid) -> Result<Vec<AssignedUserDto>, AppError> {
        let team = sqlx::query_as::<_, AssignedUserDto>(
            "SELECT u.id AS user_id, u.first_name, u.last_name, u.role
             FROM student_assignments sa
             JOIN users u ON u.id = sa.user_id
             WHERE sa.student_id = $1
             ORDER BY u.last_name, u.first_name",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;
        Ok(team)
    }

    pub async fn update(
        pool: &PgPool,
        student_id: Uuid,
        req: &UpdateStudentRequest,
    ) -> Result<Student, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "UPDATE students
             SET first_name    = COALESCE($1, first_name),
                 last_name     = COALESCE($2, last_name),
                 ministry_code = COALESCE($3, ministry_code),
                 date_of_birth = COALESCE($4, date_of_birth),
                 updated_at    = NOW()
             WHERE id = $5
             RETURNING *",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.ministry_code)
        .bind(req.date_of_birth)
        .bind(student_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;
        Ok(student)
    }

    /// Merge user_ids into the assignment list (set union, no duplicates).
    /// Newly added members are notified individually; the pre-existing team
    /// gets one "care team updated" notification each.
    pub async fn assign_users(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<StudentWithTeam, AppError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".into()))?;

        let existing: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM student_assignments WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;

        // Only known, active accounts can join the team.
        let valid_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM users WHERE id = ANY($1) AND is_active = TRUE",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await?;

        let new_ids: Vec<Uuid> = valid_ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect();

        for user_id in &new_ids {
            sqlx::query(
                "INSERT INTO student_assignments (student_id, user_id, assigned_by)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (student_id, user_id) DO NOTHING",
            )
            .bind(student_id)
            .bind(user_id)
            .bind(actor.user_id)
            .execute(pool)
            .await?;
        }

        if !new_ids.is_empty() {
            let assigner_name = NotificationService::user_name(pool, actor.user_id).await;
            let student_name = student.full_name();

            let assigned = notifications::student_assigned(&assigner_name, &student_name)
                .student(student_id)
                .user(actor.user_id);
            NotificationService::fan_out(pool, &new_ids, &assigned).await;

            let mut new_names = Vec::with_capacity(new_ids.len());
            for id in &new_ids {
                new_names.push(NotificationService::user_name(pool, *id).await);
            }
            let team_update = notifications::team_member_added(&new_names, &student_name)
                .student(student_id)
                .user(actor.user_id);
            NotificationService::fan_out(pool, &existing, &team_update).await;
        }

        Self::get_with_team(pool, student_id).await
    }

    /// Parent self-claim of a student nobody is assigned to yet.
    pub async fn assign_self(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> Result<StudentWithTeam, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
            .bind(student_id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(AppError::NotFound("Student not found".into()));
        }

        let team_size: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM student_assignments WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(pool)
        .await?;
        if team_size > 0 {
            return Err(AppError::Conflict(
                "Student already has assigned users".into(),
            ));
        }

        sqlx::query(
            "INSERT INTO student_assignments (student_id, user_id, assigned_by)
             VALUES ($1, $2, $2)
             ON CONFLICT (student_id, user_id) DO NOTHING",
        )
        .bind(student_id)
        .bind(actor.user_id)
        .execute(pool)
        .await?;

        Self::get_with_team(pool, student_id).await
    }
}
