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
    config::Config,
    db,
    middleware::auth::{require_auth, AuthLayer, ExemptPath},
    routes, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_candidate_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let state = AppState {
        db: pool,
        config: config.clone(),
        http: reqwest::Client::new(),
    };

    // /candidates/internal is the auth-service sync endpoint — exact match
    // only, subpaths stay protected.
    let auth = AuthLayer::new(
        &config.jwt_secret,
        vec![
            ExemptPath::Exact("/candidates/internal"),
            ExemptPath::Exact("/health"),
        ],
    );

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/candidates/internal", post(routes::candidates::create_internal))
        .route(
            "/candidates/me",
            get(routes::candidates::me).put(routes::candidates::update_me),
        )
        .route(
            "/candidates/me/cv",
            post(routes::candidates::upload_cv).get(routes::candidates::download_cv),
        )
        .route("/candidates/{email}", get(routes::candidates::get_by_email))
        .route(
            "/candidates/{email}/cv",
            get(routes::candidates::download_cv_for_recruiter),
        )
        .layer(middleware::from_fn_with_state(auth, require_auth))
        .layer(TraceLayer::new_for_http())
        // CV uploads: 25 MB cap.
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("candidate-service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
