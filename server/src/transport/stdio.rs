//! Stdio transport: one synthetic agent registered for the lifetime of
//! the process, one JSON-RPC message per line in each direction.
//!
//! Runs the same `tokio::select!` shape as the WebSocket transport (spec
//! §4.9's "delivered asynchronously and out-of-band of the request/response
//! channel") so AI-move/game-state notifications interleave with
//! request/response lines on stdout rather than only the latter.

use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::agent::{ClientInfo, TransportTag};
use crate::router::RpcRouter;
use crate::AppState;

pub async fn run(state: Arc<AppState>, router: Arc<RpcRouter>) -> anyhow::Result<()> {
    let agent_id = state
        .agents
        .register_or_touch(None, ClientInfo { name: "stdio".to_string(), version: "0".to_string() }, TransportTag::Stdio)
        .map_err(|e| anyhow::anyhow!("failed to register the stdio agent: {e}"))?;
    let notifications = state.notifications.subscribe(&agent_id);

    tracing::info!(agent_id, "stdio transport started");

    let stdin = io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(response) = router.handle_line(&agent_id, &line).await {
                    stdout.write_all(response.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
            }
            notification = notifications.recv() => {
                let text = serde_json::to_string(&notification).expect("JsonRpcNotification always serializes");
                stdout.write_all(text.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }
    }

    tracing::info!(agent_id, "stdio transport reached EOF, shutting down");
    Ok(())
}
