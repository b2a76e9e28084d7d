use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recruit_api::config::GatewayConfig;
use recruit_api::gateway::{self, GatewayState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(GatewayConfig::from_env()?);

    let state = GatewayState {
        config: config.clone(),
        http: reqwest::Client::new(),
    };
    let app = gateway::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
