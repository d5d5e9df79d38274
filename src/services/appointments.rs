use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        appointment::{Appointment, CreateAppointmentRequest, UpdateAppointmentRequest},
        auth::AuthenticatedUser,
        notification::NotificationKind,
    },
    services::notifications::{self, NotificationService},
};

pub struct AppointmentService;

impl AppointmentService {
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE student_id = $1 ORDER BY scheduled_at DESC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;
        Ok(appointments)
    }

    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
        req: &CreateAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        if req.title.trim().is_empty() {
            return Err(AppError::Validation("A title is required".into()));
        }
        if req.duration_minutes.is_some_and(|d| d <= 0) {
            return Err(AppError::Validation("Duration must be positive".into()));
        }

        let appointment = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments
                (student_id, created_by, title, scheduled_at, duration_minutes, location, notes)
             VALUES ($1, $2, $3, $4, COALESCE($5, 30), $6, $7)
             RETURNING *",
        )
        .bind(student_id)
        .bind(actor.user_id)
        .bind(req.title.trim())
        .bind(req.scheduled_at)
        .bind(req.duration_minutes)
        .bind(&req.location)
        .bind(&req.notes)
        .fetch_one(pool)
        .await?;

        let author = NotificationService::user_name(pool, actor.user_id).await;
        let student = NotificationService::student_name(pool, student_id).await;
        let team = NotificationService::team_recipients(pool, student_id).await?;
        let payload =
            notifications::record_added(NotificationKind::AppointmentAdded, &author, &student)
                .student(student_id)
                .user(actor.user_id);
        NotificationService::fan_out(pool, &team, &payload).await;

        Ok(appointment)
    }

    pub async fn update(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        appointment_id: Uuid,
        req: &UpdateAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        Self::require_owner(pool, actor, appointment_id).await?;
        let appointment = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments
             SET title            = COALESCE($1, title),
                 scheduled_at     = COALESCE($2, scheduled_at),
                 duration_minutes = COALESCE($3, duration_minutes),
                 location         = COALESCE($4, location),
                 notes            = COALESCE($5, notes),
                 updated_at       = NOW()
             WHERE id = $6
             RETURNING *",
        )
        .bind(&req.title)
        .bind(req.scheduled_at)
        .bind(req.duration_minutes)
        .bind(&req.location)
        .bind(&req.notes)
        .bind(appointment_id)
        .fetch_one(pool)
        .await?;
        Ok(appointment)
    }

    pub async fn delete(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        appointment_id: Uuid,
    ) -> Result<(), AppError> {
        Self::require_owner(pool, actor, appointment_id).await?;
        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(appointment_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn require_owner(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        appointment_id: Uuid,
    ) -> Result<(), AppError> {
        let created_by: Option<Uuid> =
            sqlx::query_scalar("SELECT created_by FROM appointments WHERE id = $1")
                .bind(appointment_id)
                .fetch_optional(pool)
                .await?;
        let created_by =
            created_by.ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;
        if created_by != actor.user_id && !actor.is_admin {
            return Err(AppError::Authorization(
                "Only the author or an admin may modify this appointment".into(),
            ));
        }
        Ok(())
    }
}
