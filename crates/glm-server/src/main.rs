use std::sync::Arc;

use glm_engine::ModelLoader;
use glm_runtime::{Glm3ResponseProcessor, MockLoader};
use glm_server::{run_server, AppState, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;

    let loader = MockLoader::default();
    let state = AppState::load(&settings, &loader, Arc::new(Glm3ResponseProcessor::new()))?;

    run_server(state, addr, shutdown_signal()).await?;

    // Free accelerator memory once in-flight requests have drained.
    loader.release();
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
