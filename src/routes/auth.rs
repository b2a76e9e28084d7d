use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    models::user::{AuthResponse, LoginRequest, RegisterRequest, Role},
    services::auth::AuthService,
    AppState,
};

pub async fn register_candidate(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<Value>)> {
    AuthService::register(&state.db, &state.http, &state.config, Role::Candidate, &body)
        .await
        .map(Json)
        .map_err(bad_request)
}

pub async fn register_recruiter(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<Value>)> {
    info!(email = %body.email, "recruiter registration request");
    AuthService::register(&state.db, &state.http, &state.config, Role::Recruiter, &body)
        .await
        .map(Json)
        .map_err(bad_request)
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<Value>)> {
    AuthService::login(&state.db, &state.config, &body)
        .await
        .map(Json)
        .map_err(bad_request)
}

fn bad_request(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}
