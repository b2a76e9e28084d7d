use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::models::ai::{ExtractResponse, MatchRequest};

/// Thin client for the Python matching engine. The engine is opaque — its
/// responses are forwarded as-is, only `/ai/extract` gets a typed shape
/// because candidate-service consumes it.
pub struct AiService;

impl AiService {
    pub async fn match_cv(http: &Client, base_url: &str, req: &MatchRequest) -> anyhow::Result<Value> {
        debug!(cv_len = req.cv_text.len(), "forwarding match request");
        let response = http
            .post(format!("{base_url}/ai/match"))
            .json(req)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }

    pub async fn match_file(
        http: &Client,
        base_url: &str,
        file: Vec<u8>,
        filename: &str,
        job_description: &str,
        required_skills: &[String],
    ) -> anyhow::Result<Value> {
        let part = reqwest::multipart::Part::bytes(file)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let mut form = reqwest::multipart::Form::new()
            .part("cv_file", part)
            .text("job_description", job_description.to_string());
        for skill in required_skills {
            form = form.text("required_skills", skill.clone());
        }

        let response = http
            .post(format!("{base_url}/ai/match-file"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }

    pub async fn extract(
        http: &Client,
        base_url: &str,
        file: Vec<u8>,
        filename: &str,
    ) -> anyhow::Result<ExtractResponse> {
        let part = reqwest::multipart::Part::bytes(file)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new().part("cv_file", part);

        let response = http
            .post(format!("{base_url}/ai/extract"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<ExtractResponse>()
            .await?;
        Ok(response)
    }
}
