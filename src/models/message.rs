use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MessageWithSender {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_first_name: String,
    pub sender_last_name: String,
    pub recipient_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry of the conversations overview: the partner, the latest message,
/// and how many of their messages are still unread.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConversationItem {
    pub partner_id: Uuid,
    pub partner_name: String,
    pub last_message: Option<String>,
    pub last_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub recipient_id: Uuid,
    pub content: String,
}
