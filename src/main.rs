//! # Speedmap
//!
//! Live session tracker and throughput heatmap server.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Record store (PostgreSQL or in-memory)
//! - Session cleanup task
//! - HTTP server

use anyhow::Result;
use tracing::info;

use speedmap::config::Settings;
use speedmap::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    speedmap::telemetry::init_tracing();

    info!("Starting Speedmap...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        persistent = settings.database.url.is_some(),
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
