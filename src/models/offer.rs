use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Offer {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    /// CDI, CDD, Stage, Alternance
    pub contract_type: String,
    pub salary: Option<f64>,
    pub published_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    pub active: bool,
    pub recruiter_email: String,
    pub domain: Option<String>,
    pub required_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub contract_type: String,
    pub salary: Option<f64>,
    pub expiration_date: Option<NaiveDate>,
    pub domain: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateOfferRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary: Option<f64>,
    pub expiration_date: Option<NaiveDate>,
    pub domain: Option<String>,
    pub required_skills: Option<Vec<String>>,
}

pub const APPLICATION_STATUSES: &[&str] = &["PENDING", "ACCEPTED", "REJECTED", "WITHDRAWN"];

/// Application joined with its offer for client responses.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationResponse {
    pub id: i64,
    pub offer_id: i64,
    pub offer_title: String,
    pub company: String,
    pub candidate_email: String,
    pub application_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct RecruiterStats {
    pub total_offers: i64,
    pub total_applications: i64,
    pub pending_count: i64,
    pub accepted_count: i64,
    pub rejected_count: i64,
    /// Offer title → number of applications received.
    pub applications_by_offer: HashMap<String, i64>,
}
