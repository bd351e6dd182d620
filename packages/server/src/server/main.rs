// Main entry point for the capture control surface

use anyhow::{Context, Result};
use pipeline::JsonlStore;
use server_core::{
    kernel::PipelineLauncher,
    server::{build_app, AppState},
    ServerConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting capture control surface");

    // Load configuration
    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        capture_file = %config.capture_file.display(),
        pipeline_bin = %config.pipeline_bin.display(),
        timeout_secs = config.pipeline_timeout.as_secs(),
        "Configuration loaded"
    );

    let store = JsonlStore::new(&config.capture_file);
    let launcher = PipelineLauncher::new(&config.pipeline_bin, config.pipeline_timeout);
    let app = build_app(AppState::new(store, launcher));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Status: http://localhost:{}/status", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
