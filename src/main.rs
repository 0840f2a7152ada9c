//! Countdown Timer - A state-managed countdown timer served over HTTP
//!
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, seconds={}, tick={}ms",
          config.host, config.port, config.seconds, config.tick_ms);

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.seconds,
        config.tick_interval(),
    ));

    if config.start {
        state.start().map_err(anyhow::Error::msg)?;
    }

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start            - Start or resume the countdown");
    info!("  POST /stop             - Pause the countdown");
    info!("  POST /reset            - Restore the initial seconds");
    info!("  PUT  /initial-seconds  - Set the initial seconds");
    info!("  GET  /status           - Current countdown and server status");
    info!("  GET  /events           - Live countdown as server-sent events");
    info!("  GET  /health           - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for signals: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    // Cancel the tick source before exiting
    if let Err(e) = state.stop() {
        tracing::warn!("Failed to stop timer on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
