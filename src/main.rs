//! Focus Room - A shared-room Pomodoro timer server
//!
//! This is the main entry point for the focus-room application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_room::{
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
        .with_env_filter(format!("focus_room={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-room server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, channel_capacity={}, max_chat_chars={}",
          config.host, config.port, config.channel_capacity, config.max_chat_chars);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.channel_capacity,
        config.max_chat_chars,
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /rooms                          - Create a room");
    info!("  GET  /rooms/:room_id/timer           - Timer state with live remaining time");
    info!("  POST /rooms/:room_id/timer/start     - Start the timer (host only)");
    info!("  POST /rooms/:room_id/timer/pause     - Pause the timer (host only)");
    info!("  POST /rooms/:room_id/timer/reset     - Reset the timer (host only)");
    info!("  POST /rooms/:room_id/timer/mode      - Change mode (host only)");
    info!("  POST /rooms/:room_id/timer/complete  - Acknowledge completion (host only)");
    info!("  POST /rooms/:room_id/chat            - Send a chat message");
    info!("  GET  /rooms/:room_id/ws?user=<id>    - Room event stream");
    info!("  GET  /status                         - Server status");
    info!("  GET  /health                         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
