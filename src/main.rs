use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entreefox_social::api;
use entreefox_social::config::Config;
use entreefox_social::db::init_database;
use entreefox_social::store::SocialStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,entreefox_social=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    Config::init()?;
    info!("Initialized configuration");

    // Initialize database, applying pending migrations
    let db = Arc::new(init_database().await?);
    info!("Connected to database");

    let store = Arc::new(SocialStore::new(db));

    // Start API server
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_api_server(store).await {
            error!("API server error: {}", e);
        }
    });

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }

    api_handle.abort();
    info!("EntreeFox social service shutdown complete");
    Ok(())
}
