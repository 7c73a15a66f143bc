//! WebSocket transport: one agent per connection, each text frame one
//! JSON-RPC message. Runs a `tokio::select!` loop per connection so a
//! session's async notifications (AI moves, tournament progress) can be
//! pushed out over the same socket as request/response traffic.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

use crate::agent::{ClientInfo, TransportTag};
use crate::router::RpcRouter;
use crate::AppState;

pub async fn run(state: Arc<AppState>, router: Arc<RpcRouter>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.websocket_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "websocket transport listening");

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();
        let router = router.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(state, router, stream).await {
                tracing::warn!(%peer_addr, %err, "websocket connection ended with an error");
            }
        });
    }
}

async fn handle_connection(state: Arc<AppState>, router: Arc<RpcRouter>, stream: TcpStream) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut stream) = ws_stream.split();

    let agent_id = state
        .agents
        .register_or_touch(None, ClientInfo { name: "websocket".to_string(), version: "0".to_string() }, TransportTag::WebSocket)
        .map_err(|e| anyhow::anyhow!("failed to register websocket agent: {e}"))?;
    let notifications = state.notifications.subscribe(&agent_id);

    tracing::info!(agent_id, "websocket agent connected");

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(response) = router.handle_line(&agent_id, &text).await {
                            sink.send(Message::Text(response)).await?;
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        sink.send(Message::Pong(payload)).await?;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(agent_id, %err, "websocket read error");
                        break;
                    }
                }
            }
            notification = notifications.recv() => {
                let text = serde_json::to_string(&notification).expect("JsonRpcNotification always serializes");
                sink.send(Message::Text(text)).await?;
            }
        }
    }

    state.cleanup_agent(&agent_id).await;
    tracing::info!(agent_id, "websocket agent disconnected and was cleaned up");
    Ok(())
}
