use std::sync::Arc;

use anyhow::Context;

use stockroom_api::app::{build_app, services::build_services};
use stockroom_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    stockroom_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = build_services(&config)
        .await
        .context("failed to initialize product store")?;
    tracing::info!(store = %services.backend, "product store ready");

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
