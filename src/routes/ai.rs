use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::auth::Principal, models::ai::MatchRequest, services::ai::AiService, AiState,
};

pub async fn match_cv(
    State(state): State<AiState>,
    _principal: Principal,
    Json(body): Json<MatchRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    AiService::match_cv(&state.http, &state.config.python_base_url, &body)
        .await
        .map(Json)
        .map_err(bad_gateway)
}

pub async fn match_cv_file(
    State(state): State<AiState>,
    _principal: Principal,
    multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (file, filename, job_description, required_skills) =
        read_match_form(multipart).await.map_err(bad_request)?;
    AiService::match_file(
        &state.http,
        &state.config.python_base_url,
        file,
        &filename,
        &job_description,
        &required_skills,
    )
    .await
    .map(Json)
    .map_err(bad_gateway)
}

/// Service-to-service extraction endpoint, exempt from the JWT filter:
/// candidate-service calls it while processing CV uploads.
pub async fn extract_cv(
    State(state): State<AiState>,
    multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (file, filename) = read_file_form(multipart).await.map_err(bad_request)?;
    AiService::extract(&state.http, &state.config.python_base_url, file, &filename)
        .await
        .map(|r| Json(serde_json::to_value(r).unwrap_or_default()))
        .map_err(bad_gateway)
}

async fn read_file_form(mut multipart: Multipart) -> anyhow::Result<(Vec<u8>, String)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("cv.pdf").to_string();
            let bytes = field.bytes().await?.to_vec();
            return Ok((bytes, filename));
        }
    }
    anyhow::bail!("No file field in upload")
}

async fn read_match_form(
    mut multipart: Multipart,
) -> anyhow::Result<(Vec<u8>, String, String, Vec<String>)> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut job_description = String::new();
    let mut required_skills = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("cv.pdf").to_string();
                file = Some((field.bytes().await?.to_vec(), filename));
            }
            Some("job_description") => job_description = field.text().await?,
            Some("required_skills") => required_skills.push(field.text().await?),
            _ => {}
        }
    }

    let (bytes, filename) = file.ok_or_else(|| anyhow::anyhow!("No file field in upload"))?;
    if job_description.is_empty() {
        anyhow::bail!("Missing job_description field");
    }
    Ok((bytes, filename, job_description, required_skills))
}

fn bad_request(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}

fn bad_gateway(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": format!("AI service failed: {e}") })),
    )
}
