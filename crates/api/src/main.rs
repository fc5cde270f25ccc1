use anyhow::{Context, Result};
use api::{AppConfig, AppState, create_router};
use extract::SpacyClient;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()?;

    let parser = SpacyClient::new(
        config.parser.url.clone(),
        config.parser.model.clone(),
        Duration::from_secs(config.parser.timeout_secs),
    )?;
    tracing::info!(parser = %parser.base_url(), "Using dependency parser");

    let bind_addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::init(config, Arc::new(parser)).await?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var("KG_LOG_JSON").is_ok_and(|v| v == "1");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
