use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::auth::{require_role, Principal},
    models::{
        candidate::{Candidate, CandidateUpdateRequest},
        user::{CandidateSyncRequest, Role},
    },
    services::candidates::CandidateService,
    AppState,
};

/// Internal endpoint called by auth-service after a candidate registers.
/// Exempt from the JWT filter.
pub async fn create_internal(
    State(state): State<AppState>,
    Json(body): Json<CandidateSyncRequest>,
) -> Result<(StatusCode, Json<Candidate>), (StatusCode, Json<Value>)> {
    CandidateService::create(&state.db, &body)
        .await
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(bad_request)
}

pub async fn me(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Candidate>, (StatusCode, Json<Value>)> {
    CandidateService::get_by_email(&state.db, &principal.email)
        .await
        .map(Json)
        .map_err(not_found)
}

pub async fn update_me(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CandidateUpdateRequest>,
) -> Result<Json<Candidate>, (StatusCode, Json<Value>)> {
    CandidateService::update(&state.db, &principal.email, &body)
        .await
        .map(Json)
        .map_err(bad_request)
}

pub async fn upload_cv(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    CandidateService::upload_cv(
        &state.db,
        &state.http,
        &state.config.ai_service_url,
        &state.config.upload_dir,
        &principal.email,
        multipart,
    )
    .await
    .map(|c| {
        Json(json!({
            "message": "CV uploaded successfully",
            "filename": c.cv_file_name,
            "upload_date": c.cv_upload_date,
        }))
    })
    .map_err(bad_request)
}

pub async fn download_cv(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Response, (StatusCode, Json<Value>)> {
    serve_cv(&state, &principal.email).await
}

/// Recruiter view of any candidate's profile.
pub async fn get_by_email(
    State(state): State<AppState>,
    principal: Principal,
    Path(email): Path<String>,
) -> Result<Json<Candidate>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    CandidateService::get_by_email(&state.db, &email)
        .await
        .map(Json)
        .map_err(not_found)
}

pub async fn download_cv_for_recruiter(
    State(state): State<AppState>,
    principal: Principal,
    Path(email): Path<String>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    serve_cv(&state, &email).await
}

async fn serve_cv(state: &AppState, email: &str) -> Result<Response, (StatusCode, Json<Value>)> {
    let (path, filename) = CandidateService::cv_location(&state.db, email)
        .await
        .map_err(not_found)?;

    let bytes = tokio::fs::read(&path).await.map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "CV file not found or not readable" })),
        )
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })
}

fn bad_request(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}

fn not_found(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() })))
}
