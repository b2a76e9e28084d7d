use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Candidate,
    Recruiter,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Candidate => "CANDIDATE",
            Role::Recruiter => "RECRUITER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    /// Case-insensitive; accepts an optional `ROLE_` prefix so authority
    /// strings parse back to the same role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match name {
            "CANDIDATE" => Ok(Role::Candidate),
            "RECRUITER" => Ok(Role::Recruiter),
            _ => Err(anyhow::anyhow!("Unknown role: {s}")),
        }
    }
}

/// DB row struct — role is stored as TEXT.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub role: String,
}

/// Internal payload auth-service sends to candidate-service after a candidate
/// registers, so the profile exists before the first login.
#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateSyncRequest {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("candidate".parse::<Role>().unwrap(), Role::Candidate);
        assert_eq!("RECRUITER".parse::<Role>().unwrap(), Role::Recruiter);
        assert_eq!("ROLE_RECRUITER".parse::<Role>().unwrap(), Role::Recruiter);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_display_round_trips() {
        assert_eq!(Role::Candidate.to_string().parse::<Role>().unwrap(), Role::Candidate);
        assert_eq!(Role::Recruiter.to_string(), "RECRUITER");
    }
}
