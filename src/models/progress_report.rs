use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgressReport {
    pub id: Uuid,
    pub student_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub content: String,
    pub period: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProgressReportRequest {
    pub title: String,
    pub content: String,
    /// e.g. "2025-Q3", "September 2025"
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressReportRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub period: Option<String>,
}
