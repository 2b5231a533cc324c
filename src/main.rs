use anyhow::{Context, Result};
use sparrow_fusion::api::create_router;
use sparrow_fusion::client::HttpControllerClient;
use sparrow_fusion::config;
use sparrow_fusion::dashboard::Dashboard;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sparrow_fusion=info".into()),
        )
        .init();

    info!("Sparrow fusion starting...");

    let config = config::load_from_env()?;
    info!(
        controller = %config.controller.base_url,
        bind_addr = %config.api.bind_addr,
        "Configuration loaded"
    );

    let client = HttpControllerClient::new(
        config.controller.base_url.clone(),
        config.controller.request_timeout(),
    )
    .context("Failed to build controller client")?;

    let bind_addr = config.api.bind_addr.clone();
    let dashboard = Arc::new(Dashboard::new(config, Arc::new(client)));
    let background = dashboard.spawn_background();

    let app = create_router(dashboard);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!(addr = %bind_addr, "View API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    for task in background {
        task.abort();
    }
    info!("Sparrow fusion stopped");
    Ok(())
}
