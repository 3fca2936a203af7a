use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use xero_relay::{api, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xero_relay=info,tower_http=info".into()),
        )
        .init();

    // Load config
    let config = Config::from_env()?;
    info!("xero-relay v{}", env!("CARGO_PKG_VERSION"));
    if !config.has_client_credentials() {
        warn!("XERO_CLIENT_ID / XERO_CLIENT_SECRET not set; token refreshes will fail");
    }

    let addr = config.bind_addr();
    let state: SharedState = Arc::new(AppState::from_config(config)?);
    info!(
        token_url = %state.config.token_url,
        api_url = %state.config.api_url,
        timeout_secs = state.config.upstream_timeout.as_secs(),
        "Upstream Xero endpoints configured"
    );

    // Build router
    let app = api::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
}
