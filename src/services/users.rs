use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user::{ProfessionalDto, UpdateUserRequest, User},
};

pub struct UserService;

impl UserService {
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    /// Active clinical/school professionals — the directory used to pick
    /// collaborators and message recipients.
    pub async fn list_professionals(pool: &PgPool) -> Result<Vec<ProfessionalDto>, AppError> {
        let users = sqlx::query_as::<_, ProfessionalDto>(
            "SELECT id, first_name, last_name, role, specialization
             FROM users
             WHERE is_active = TRUE
               AND role IN ('psychiatrist', 'therapist', 'school_staff', 'specialist_educator')
             ORDER BY last_name, first_name",
        )
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpdateUserRequest,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET first_name     = COALESCE($1, first_name),
                 last_name      = COALESCE($2, last_name),
                 specialization = COALESCE($3, specialization),
                 is_active      = COALESCE($4, is_active),
                 updated_at     = NOW()
             WHERE id = $5
             RETURNING *",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.specialization)
        .bind(req.is_active)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        Ok(user)
    }
}
