// Shared library linked by all five service binaries.
pub mod config;
pub mod db;
pub mod gateway;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use config::{AiConfig, Config};

/// Application state shared across the handlers of a database-backed service
/// (auth, candidate, offer).
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

/// State for the ai-service, which holds no database of its own — it only
/// forwards to the Python matching engine.
#[derive(Clone)]
pub struct AiState {
    pub config: Arc<AiConfig>,
    pub http: reqwest::Client,
}
