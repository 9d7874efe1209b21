//! payrelay binary
//!
//! Serves `POST /convert` backed by a CoinGecko rate cache.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payrelay_fx::{CoinGeckoProvider, FxEngine, RateCache};
use payrelay_server::api::{cors_layer, router, AppState};
use payrelay_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting payrelay");

    // Load configuration
    let config = ServerConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(
        cache_ttl_secs = config.cache.ttl.as_secs(),
        price_api = %config.coingecko.base_url,
        api_key_set = config.coingecko.api_key.is_some(),
        cors_origins = ?config.cors.allowed_origins,
        "Configuration loaded"
    );

    let provider = CoinGeckoProvider::new(config.coingecko.clone())
        .context("Failed to build HTTP client")?;
    let cache = Arc::new(RateCache::with_config(config.cache.clone()));
    let engine = Arc::new(FxEngine::new(Arc::new(provider), cache.clone()));

    let app = router(
        AppState::new(engine, config.wallet_address.as_str()),
        cors_layer(&config.cors),
    );

    let addr = config.socket_addr().map_err(anyhow::Error::msg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(listen = %addr, "payrelay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stats = cache.stats();
    info!(
        total_entries = stats.total_entries,
        valid_entries = stats.valid_entries,
        expired_entries = stats.expired_entries,
        "Rate cache at shutdown"
    );

    info!("payrelay shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
