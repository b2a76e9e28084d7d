use std::sync::Arc;

use axum::{middleware, routing::get, routing::post, Router};
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
    db::run_auth_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let state = AppState {
        db: pool,
        config: config.clone(),
        http: reqwest::Client::new(),
    };

    // All /auth endpoints are public by definition; the filter still runs so
    // any future protected endpoint is covered by default.
    let auth = AuthLayer::new(
        &config.jwt_secret,
        vec![ExemptPath::Prefix("/auth"), ExemptPath::Exact("/health")],
    );

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register-candidate", post(routes::auth::register_candidate))
        .route("/auth/register-recruiter", post(routes::auth::register_recruiter))
        .route("/auth/login", post(routes::auth::login))
        .layer(middleware::from_fn_with_state(auth, require_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("auth-service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
