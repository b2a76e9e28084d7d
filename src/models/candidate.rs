use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: i64,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cv_file_name: Option<String>,
    /// Filesystem location of the stored CV — never exposed to clients.
    #[serde(skip_serializing)]
    pub cv_storage_path: Option<String>,
    pub cv_upload_date: Option<DateTime<Utc>>,
    pub cv_text: Option<String>,
    pub skills: Option<Vec<String>>,
    pub extracted_category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct CandidateUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
