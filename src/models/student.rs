use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub ministry_code: Option<String>,
    pub date_of_birth: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One row of the authoritative access list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentAssignment {
    pub student_id: Uuid,
    pub user_id: Uuid,
    pub assigned_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub ministry_code: Option<String>,
    pub date_of_birth: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub ministry_code: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AssignUsersRequest {
    pub user_ids: Vec<Uuid>,
}

/// Student plus its current care team, as returned by the detail endpoints.
#[derive(Debug, Serialize)]
pub struct StudentWithTeam {
    #[serde(flatten)]
    pub student: Student,
    pub assigned_users: Vec<AssignedUserDto>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssignedUserDto {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}
