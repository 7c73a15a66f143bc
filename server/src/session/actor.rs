//! The session actor loop (spec §4.5). One task per session; owns its
//! `SessionState` exclusively and processes commands one at a time, which
//! is what makes "operations apply in the order their locks are acquired;
//! no interleaving" (spec §5) true without an explicit mutex.

use tokio::sync::mpsc;
use tracing::Instrument;

use super::commands::SessionCommand;
use super::state::SessionState;

pub(crate) async fn run_session_actor(state: SessionState, cmd_rx: mpsc::Receiver<SessionCommand>) {
    let session_id = state.session_id.clone();
    run_session_actor_inner(state, cmd_rx).instrument(tracing::info_span!("session", id = %session_id)).await;
}

async fn run_session_actor_inner(mut state: SessionState, mut cmd_rx: mpsc::Receiver<SessionCommand>) {
    tracing::info!("session actor started");

    if let Ok(Some(opening)) = state.opening_move().await {
        tracing::debug!(uci = %opening.uci, "AI opening move played as white");
        publish_ai_opening(&state, &opening).await;
    }

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SessionCommand::Shutdown => break,
            cmd => handle_command(&mut state, cmd).await,
        }
    }

    tracing::info!("session actor exited");
}

async fn handle_command(state: &mut SessionState, cmd: SessionCommand) {
    match cmd {
        SessionCommand::MakeMove { uci, reply } => {
            let result = state.make_move(&uci).await;
            if let Ok(ref move_result) = result {
                publish_move_notifications(state, move_result).await;
            }
            let _ = reply.send(result);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::GetLegalMoves { reply } => {
            let _ = reply.send(state.legal_moves());
        }
        SessionCommand::Analyze { depth, reply } => {
            let _ = reply.send(state.analyze(depth).await);
        }
        SessionCommand::Hint { hint_level, reply } => {
            let _ = reply.send(state.hint(hint_level).await);
        }
        SessionCommand::OpeningMove { reply } => {
            let _ = reply.send(state.opening_move().await);
        }
        SessionCommand::Shutdown => unreachable!("handled by the caller before dispatch"),
    }
}

async fn publish_move_notifications(state: &SessionState, result: &super::commands::MoveResult) {
    let bus = state.deps.notification_bus.clone();
    if let Some(ai_move) = &result.ai_move {
        bus.publish(
            &state.agent_id,
            "notifications/chess/ai_move",
            serde_json::json!({
                "sessionId": state.session_id,
                "playerMove": result.player_move.uci,
                "aiMove": ai_move.uci,
                "fen": result.fen,
            }),
        )
        .await;
    }
    if result.status.is_terminal() {
        bus.publish(
            &state.agent_id,
            "notifications/chess/game_state",
            serde_json::json!({ "sessionId": state.session_id, "status": result.status.as_str() }),
        )
        .await;
    }
}

async fn publish_ai_opening(state: &SessionState, opening: &super::commands::MoveRecord) {
    state
        .deps
        .notification_bus
        .publish(
            &state.agent_id,
            "notifications/chess/ai_move",
            serde_json::json!({
                "sessionId": state.session_id,
                "playerMove": serde_json::Value::Null,
                "aiMove": opening.uci,
                "fen": state.game.to_fen(),
            }),
        )
        .await;
}
