use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};

use mcp_chess_server::config::ServerConfig;
use mcp_chess_server::{transport, AppState};

const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("starting chess MCP server");

    let config = ServerConfig::from_env();
    tracing::info!(transport = ?config.transport, websocket_port = config.websocket_port, "configuration loaded");

    let state = AppState::new(config);

    let sweep_state = state.clone();
    let sweep_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweep_state.sweep().await;
        }
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        result = transport::run(state) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "transport loop exited with an error");
            }
        }
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            tracing::info!("received SIGINT, shutting down");
        }
    }

    sweep_task.abort();
    tracing::info!("chess MCP server shut down");
    Ok(())
}
