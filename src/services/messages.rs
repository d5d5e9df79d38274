use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::message::{ConversationItem, CreateMessageRequest, Message, MessageWithSender},
};

pub struct MessageService;

impl MessageService {
    pub async fn send(
        pool: &PgPool,
        sender_id: Uuid,
        req: &CreateMessageRequest,
    ) -> Result<MessageWithSender, AppError> {
        if req.content.trim().is_empty() {
            return Err(AppError::Validation("Message content is required".into()));
        }
        if req.recipient_id == sender_id {
            return Err(AppError::Validation("Cannot message yourself".into()));
        }

        let recipient_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND is_active = TRUE)",
        )
        .bind(req.recipient_id)
        .fetch_one(pool)
        .await?;
        if !recipient_exists {
            return Err(AppError::NotFound("Recipient not found".into()));
        }

        let msg = sqlx::query_as::<_, MessageWithSender>(
            "WITH inserted AS (
                 INSERT INTO messages (sender_id, recipient_id, content)
                 VALUES ($1, $2, $3)
                 RETURNING *
             )
             SELECT i.id, i.sender_id,
                 u.first_name AS sender_first_name, u.last_name AS sender_last_name,
                 i.recipient_id, i.content, i.read, i.created_at
             FROM inserted i
             JOIN users u ON u.id = i.sender_id",
        )
        .bind(sender_id)
        .bind(req.recipient_id)
        .bind(req.content.trim())
        .fetch_one(pool)
        .await?;

        Ok(msg)
    }

    pub async fn get_conversation(
        pool: &PgPool,
        user_a: Uuid,
        user_b: Uuid,
        per_page: i64,
        offset: i64,
    ) -> Result<Vec<Message>, AppError> {
        let msgs = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE (sender_id = $1 AND recipient_id = $2)
                OR (sender_id = $2 AND recipient_id = $1)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(msgs)
    }

    /// Distinct conversation partners with the latest message and the count
    /// of their messages still unread by the caller.
    pub async fn get_conversations(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ConversationItem>, AppError> {
        let items = sqlx::query_as::<_, ConversationItem>(
            "SELECT u.id AS partner_id,
                    CONCAT(u.first_name, ' ', u.last_name) AS partner_name,
                    (SELECT m.content FROM messages m
                     WHERE (m.sender_id = u.id AND m.recipient_id = $1)
                        OR (m.sender_id = $1 AND m.recipient_id = u.id)
                     ORDER BY m.created_at DESC LIMIT 1) AS last_message,
                    (SELECT m.created_at FROM messages m
                     WHERE (m.sender_id = u.id AND m.recipient_id = $1)
                        OR (m.sender_id = $1 AND m.recipient_id = u.id)
                     ORDER BY m.created_at DESC LIMIT 1) AS last_at,
                    (SELECT COUNT(*) FROM messages m
                     WHERE m.sender_id = u.id AND m.recipient_id = $1
                       AND m.read = FALSE) AS unread_count
             FROM users u
             WHERE u.id <> $1
               AND EXISTS (
                 SELECT 1 FROM messages mm
                 WHERE (mm.sender_id = u.id AND mm.recipient_id = $1)
                    OR (mm.sender_id = $1 AND mm.recipient_id = u.id)
               )
             ORDER BY last_at DESC NULLS LAST",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(items)
    }

    /// Recipient only.
    pub async fn mark_read(
        pool: &PgPool,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let updated = sqlx::query(
            "UPDATE messages SET read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(message_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Message not found".into()));
        }
        Ok(())
    }
}
