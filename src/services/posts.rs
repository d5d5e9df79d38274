use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        post::{CreatePostRequest, Post, PostWithAuthor, UpdatePostRequest},
    },
};

pub struct PostService;

impl PostService {
    /// Community feed, newest first.
    pub async fn list(
        pool: &PgPool,
        per_page: i64,
        offset: i64,
    ) -> Result<Vec<PostWithAuthor>, AppError> {
        let posts = sqlx::query_as::<_, PostWithAuthor>(
            "SELECT p.id, p.author_id,
                    CONCAT(u.first_name, ' ', u.last_name) AS author_name,
                    u.role AS author_role,
                    p.title, p.content, p.created_at, p.updated_at
             FROM posts p
             JOIN users u ON u.id = p.author_id
             ORDER BY p.created_at DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(posts)
    }

    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        req: &CreatePostRequest,
    ) -> Result<Post, AppError> {
        if req.title.trim().is_empty() || req.content.trim().is_empty() {
            return Err(AppError::Validation("Title and content are required".into()));
        }

        let post = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (author_id, title, content)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(actor.user_id)
        .bind(req.title.trim())
        .bind(&req.content)
        .fetch_one(pool)
        .await?;
        Ok(post)
    }

    pub async fn update(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        post_id: Uuid,
        req: &UpdatePostRequest,
    ) -> Result<Post, AppError> {
        Self::require_author(pool, actor, post_id).await?;
        let post = sqlx::query_as::<_, Post>(
            "UPDATE posts
             SET title   = COALESCE($1, title),
                 content = COALESCE($2, content),
                 updated_at = NOW()
             WHERE id = $3
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(post_id)
        .fetch_one(pool)
        .await?;
        Ok(post)
    }

    pub async fn delete(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        post_id: Uuid,
    ) -> Result<(), AppError> {
        Self::require_author(pool, actor, post_id).await?;
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn require_author(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        post_id: Uuid,
    ) -> Result<(), AppError> {
        let author_id: Option<Uuid> =
            sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
                .bind(post_id)
                .fetch_optional(pool)
                .await?;
        let author_id = author_id.ok_or_else(|| AppError::NotFound("Post not found".into()))?;
        if author_id != actor.user_id && !actor.is_admin {
            return Err(AppError::Authorization(
                "Only the author or an admin may modify this post".into(),
            ));
        }
        Ok(())
    }
}
