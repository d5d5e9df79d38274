use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Pending and approved requests count against the one-active-request
    /// rule; rejected ones do not.
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(anyhow::anyhow!("Unknown request status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Notes,
    Appointments,
    ProgressReports,
    All,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestType::Notes => "notes",
            RequestType::Appointments => "appointments",
            RequestType::ProgressReports => "progress_reports",
            RequestType::All => "all",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RequestType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notes" => Ok(RequestType::Notes),
            "appointments" => Ok(RequestType::Appointments),
            "progress_reports" => Ok(RequestType::ProgressReports),
            "all" => Ok(RequestType::All),
            _ => Err(anyhow::anyhow!("Unknown request type: {s}")),
        }
    }
}

/// DB row — status/request_type stored as TEXT, parsed at the edges.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CollaborationRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub student_id: Uuid,
    pub request_type: String,
    pub reason: String,
    pub status: String,
    pub admin_response: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin listing row with requester and student names joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CollaborationRequestDetail {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub requester_name: String,
    pub requester_role: String,
    pub student_id: Uuid,
    pub student_name: String,
    pub request_type: String,
    pub reason: String,
    pub status: String,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollaborationRequest {
    pub student_id: Uuid,
    pub request_type: RequestType,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequestStatus {
    pub status: RequestStatus,
    pub admin_response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_and_activity() {
        for s in ["pending", "approved", "rejected"] {
            let st: RequestStatus = s.parse().unwrap();
            assert_eq!(st.to_string(), s);
        }
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Approved.is_active());
        assert!(!RequestStatus::Rejected.is_active());
    }

    #[test]
    fn request_type_round_trips() {
        for s in ["notes", "appointments", "progress_reports", "all"] {
            let t: RequestType = s.parse().unwrap();
            assert_eq!(t.to_string(), s);
        }
        assert!("grades".parse::<RequestType>().is_err());
    }
}
