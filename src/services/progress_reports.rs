use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        notification::NotificationKind,
        progress_report::{
            CreateProgressReportRequest, ProgressReport, UpdateProgressReportRequest,
        },
    },
    services::notifications::{self, NotificationService},
};

pub struct ProgressReportService;

impl ProgressReportService {
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<ProgressReport>, AppError> {
        let reports = sqlx::query_as::<_, ProgressReport>(
            "SELECT * FROM progress_reports WHERE student_id = $1 ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;
        Ok(reports)
    }

    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
        req: &CreateProgressReportRequest,
    ) -> Result<ProgressReport, AppError> {
        if req.title.trim().is_empty() || req.content.trim().is_empty() {
            return Err(AppError::Validation("Title and content are required".into()));
        }

        let report = sqlx::query_as::<_, ProgressReport>(
            "INSERT INTO progress_reports (student_id, created_by, title, content, period)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(student_id)
        .bind(actor.user_id)
        .bind(req.title.trim())
        .bind(&req.content)
        .bind(&req.period)
        .fetch_one(pool)
        .await?;

        let author = NotificationService::user_name(pool, actor.user_id).await;
        let student = NotificationService::student_name(pool, student_id).await;
        let team = NotificationService::team_recipients(pool, student_id).await?;
        let payload =
            notifications::record_added(NotificationKind::ProgressReportAdded, &author, &student)
                .student(student_id)
                .user(actor.user_id);
        NotificationService::fan_out(pool, &team, &payload).await;

        Ok(report)
    }

    pub async fn update(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        report_id: Uuid,
        req: &UpdateProgressReportRequest,
    ) -> Result<ProgressReport, AppError> {
        Self::require_owner(pool, actor, report_id).await?;
        let report = sqlx::query_as::<_, ProgressReport>(
            "UPDATE progress_reports
             SET title   = COALESCE($1, title),
                 content = COALESCE($2, content),
                 period  = COALESCE($3, period),
                 updated_at = NOW()
             WHERE id = $4
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.period)
        .bind(report_id)
        .fetch_one(pool)
        .await?;
        Ok(report)
    }

    pub async fn delete(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        report_id: Uuid,
    ) -> Result<(), AppError> {
        Self::require_owner(pool, actor, report_id).await?;
        sqlx::query("DELETE FROM progress_reports WHERE id = $1")
            .bind(report_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn require_owner(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        report_id: Uuid,
    ) -> Result<(), AppError> {
        let created_by: Option<Uuid> =
            sqlx::query_scalar("SELECT created_by FROM progress_reports WHERE id = $1")
                .bind(report_id)
                .fetch_optional(pool)
                .await?;
        let created_by =
            created_by.ok_or_else(|| AppError::NotFound("Progress report not found".into()))?;
        if created_by != actor.user_id && !actor.is_admin {
            return Err(AppError::Authorization(
                "Only the author or an admin may modify this report".into(),
            ));
        }
        Ok(())
    }
}
