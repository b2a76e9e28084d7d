use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::auth::{require_role, Principal},
    models::{
        offer::{
            ApplicationResponse, ApplicationStatusRequest, CreateOfferRequest, Offer,
            RecruiterStats, UpdateOfferRequest,
        },
        user::Role,
    },
    services::offers::OfferService,
    AppState,
};

pub async fn list_offers(
    State(state): State<AppState>,
    _principal: Principal,
) -> Result<Json<Vec<Offer>>, (StatusCode, Json<Value>)> {
    OfferService::list_active(&state.db)
        .await
        .map(Json)
        .map_err(internal)
}

pub async fn get_offer(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<Offer>, (StatusCode, Json<Value>)> {
    OfferService::get(&state.db, id)
        .await
        .map(Json)
        .map_err(not_found)
}

pub async fn my_offers(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<Offer>>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    OfferService::list_by_recruiter(&state.db, &principal.email)
        .await
        .map(Json)
        .map_err(internal)
}

pub async fn create_offer(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<Offer>), (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    OfferService::create(&state.db, &principal.email, &body)
        .await
        .map(|offer| (StatusCode::CREATED, Json(offer)))
        .map_err(bad_request)
}

pub async fn update_offer(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(body): Json<UpdateOfferRequest>,
) -> Result<Json<Offer>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    OfferService::update(&state.db, &principal.email, id, &body)
        .await
        .map(Json)
        .map_err(forbidden)
}

pub async fn delete_offer(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    OfferService::delete(&state.db, &principal.email, id)
        .await
        .map(|_| Json(json!({ "message": "Offer deleted successfully" })))
        .map_err(forbidden)
}

pub async fn apply_to_offer(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ApplicationResponse>), (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Candidate) {
        return Err(err);
    }
    OfferService::apply(&state.db, &principal.email, id)
        .await
        .map(|a| (StatusCode::CREATED, Json(a)))
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string(), "offerId": id })),
            )
        })
}

pub async fn my_applications(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<ApplicationResponse>>, (StatusCode, Json<Value>)> {
    OfferService::my_applications(&state.db, &principal.email)
        .await
        .map(Json)
        .map_err(internal)
}

pub async fn applications_for_offer(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ApplicationResponse>>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    OfferService::applications_for_offer(&state.db, id)
        .await
        .map(Json)
        .map_err(internal)
}

pub async fn update_application_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(body): Json<ApplicationStatusRequest>,
) -> Result<Json<ApplicationResponse>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    OfferService::update_application_status(&state.db, &principal.email, id, &body.status)
        .await
        .map(Json)
        .map_err(forbidden)
}

pub async fn recruiter_stats(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<RecruiterStats>, (StatusCode, Json<Value>)> {
    if let Some(err) = require_role(&principal, Role::Recruiter) {
        return Err(err);
    }
    OfferService::recruiter_stats(&state.db, &principal.email)
        .await
        .map(Json)
        .map_err(internal)
}

fn bad_request(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}

fn forbidden(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::FORBIDDEN, Json(json!({ "error": e.to_string() })))
}

fn not_found(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() })))
}

fn internal(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}
