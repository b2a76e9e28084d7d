use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
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
    db::run_offer_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let state = AppState {
        db: pool,
        config: config.clone(),
        http: reqwest::Client::new(),
    };

    let auth = AuthLayer::new(&config.jwt_secret, vec![ExemptPath::Exact("/health")]);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/offers",
            get(routes::offers::list_offers).post(routes::offers::create_offer),
        )
        .route("/offers/my-offers", get(routes::offers::my_offers))
        .route("/offers/my-applications", get(routes::offers::my_applications))
        .route("/offers/recruiter/stats", get(routes::offers::recruiter_stats))
        .route(
            "/offers/applications/{id}/status",
            put(routes::offers::update_application_status),
        )
        .route(
            "/offers/{id}",
            get(routes::offers::get_offer)
                .put(routes::offers::update_offer)
                .delete(routes::offers::delete_offer),
        )
        .route("/offers/{id}/apply", post(routes::offers::apply_to_offer))
        .route(
            "/offers/{id}/applications",
            get(routes::offers::applications_for_offer),
        )
        .layer(middleware::from_fn_with_state(auth, require_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("offer-service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
