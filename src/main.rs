use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use captcha_visits::api;
use captcha_visits::config::Config;
use captcha_visits::storage;
use captcha_visits::tracker::VisitorTracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let store = storage::open_store(&config.storage);
    info!("Using visitor store: {}", store.describe());

    let tracker = Arc::new(VisitorTracker::new(store));
    let app = api::create_app(tracker, &config);

    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving frontend from directory: {}", static_dir);
    }

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Visit endpoint available at http://{}{}/visit", addr, api::API_PREFIX);

    axum::serve(listener, app).await?;

    Ok(())
}
