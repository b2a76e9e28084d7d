use serde::{Deserialize, Serialize};

/// Request forwarded verbatim to the Python engine's `/ai/match`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatchRequest {
    pub cv_text: String,
    pub job_description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// Response of the Python engine's `/ai/extract`. The engine has shipped the
/// text under several different keys over time, hence the aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    #[serde(alias = "text", alias = "extracted_text", alias = "content")]
    pub cv_text: Option<String>,
    pub skills: Option<Vec<String>>,
    pub category: Option<String>,
}
