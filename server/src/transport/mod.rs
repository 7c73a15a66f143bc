//! Transport entry points (spec §4.10/§5): stdio for a single always-on
//! agent, WebSocket for one agent per connection. Both funnel decoded
//! frames into the same `RpcRouter::handle_line`, mirroring the way a
//! single `ChessServiceImpl` sits behind multiple transports.

mod stdio;
mod websocket;

use std::sync::Arc;

use crate::config::TransportKind;
use crate::router::RpcRouter;
use crate::AppState;

/// Runs whichever transport(s) `config.transport` selects, returning once
/// all of them have exited (stdio exits on EOF; WebSocket normally runs
/// until the process is killed).
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let router = Arc::new(RpcRouter::new(state.clone()));

    match state.config.transport {
        TransportKind::Stdio => stdio::run(state, router).await,
        TransportKind::WebSocket => websocket::run(state, router).await,
        TransportKind::Both => {
            let stdio_state = state.clone();
            let stdio_router = router.clone();
            let websocket_state = state.clone();
            let websocket_router = router.clone();
            let (stdio_result, websocket_result) = tokio::join!(
                stdio::run(stdio_state, stdio_router),
                websocket::run(websocket_state, websocket_router)
            );
            stdio_result?;
            websocket_result?;
            Ok(())
        }
    }
}
