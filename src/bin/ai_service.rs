use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recruit_api::{
    config::AiConfig,
    middleware::auth::{require_auth, AuthLayer, ExemptPath},
    routes, AiState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AiConfig::from_env()?);

    let state = AiState {
        config: config.clone(),
        http: reqwest::Client::new(),
    };

    // /ai/extract is called service-to-service by candidate-service.
    let auth = AuthLayer::new(
        &config.jwt_secret,
        vec![ExemptPath::Exact("/ai/extract"), ExemptPath::Exact("/health")],
    );

    let app = Router::new()
        .route("/health", get(routes::health::liveness))
        .route("/ai/match", post(routes::ai::match_cv))
        .route("/ai/match-file", post(routes::ai::match_cv_file))
        .route("/ai/extract", post(routes::ai::extract_cv))
        .layer(middleware::from_fn_with_state(auth, require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("ai-service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
