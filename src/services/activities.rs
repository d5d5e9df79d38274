use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        activity::{Activity, CreateActivityRequest, UpdateActivityRequest},
        auth::AuthenticatedUser,
    },
};

pub struct ActivityService;

impl ActivityService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities ORDER BY scheduled_at DESC NULLS LAST, created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(activities)
    }

    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        req: &CreateActivityRequest,
    ) -> Result<Activity, AppError> {
        if req.title.trim().is_empty() {
            return Err(AppError::Validation("A title is required".into()));
        }

        let activity = sqlx::query_as::<_, Activity>(
            "INSERT INTO activities (title, description, category, scheduled_at, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(req.title.trim())
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(&req.category)
        .bind(req.scheduled_at)
        .bind(actor.user_id)
        .fetch_one(pool)
        .await?;
        Ok(activity)
    }

    pub async fn update(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        activity_id: Uuid,
        req: &UpdateActivityRequest,
    ) -> Result<Activity, AppError> {
        Self::require_owner(pool, actor, activity_id).await?;
        let activity = sqlx::query_as::<_, Activity>(
            "UPDATE activities
             SET title        = COALESCE($1, title),
                 description  = COALESCE($2, description),
                 category     = COALESCE($3, category),
                 scheduled_at = COALESCE($4, scheduled_at),
                 updated_at   = NOW()
             WHERE id = $5
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.category)
        .bind(req.scheduled_at)
        .bind(activity_id)
        .fetch_one(pool)
        .await?;
        Ok(activity)
    }

    pub async fn delete(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        activity_id: Uuid,
    ) -> Result<(), AppError> {
        Self::require_owner(pool, actor, activity_id).await?;
        sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(activity_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn require_owner(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        activity_id: Uuid,
    ) -> Result<(), AppError> {
        let created_by: Option<Uuid> =
            sqlx::query_scalar("SELECT created_by FROM activities WHERE id = $1")
                .bind(activity_id)
                .fetch_optional(pool)
                .await?;
        let created_by =
            created_by.ok_or_else(|| AppError::NotFound("Activity not found".into()))?;
        if created_by != actor.user_id && !actor.is_admin {
            return Err(AppError::Authorization(
                "Only the creator or an admin may modify this activity".into(),
            ));
        }
        Ok(())
    }
}
