//! `ToolRegistry` — the eight `tools/call` handlers (spec §4.11).
//!
//! Each handler deserializes `arguments` into a small `#[serde(deny_unknown_fields)]`
//! struct (the "unknown fields rejected" requirement), validates the
//! business-rule fields the JSON Schema in `mcp_proto::schema` can't express
//! in Rust's type system (enums, ranges, patterns), and converts
//! `SessionError`/`engine::EngineError` into the router's `AppError`
//! taxonomy. Mirrors a one-handler-per-endpoint layout, re-targeted at
//! JSON-RPC tool names instead of gRPC method names.

use mcp_proto::AppError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::{SessionError, SessionHandle, SessionManagerError, SessionSnapshot};
use crate::AppState;

pub struct ToolRegistry;

impl ToolRegistry {
    pub async fn dispatch(state: &AppState, agent_id: &str, name: &str, arguments: Value) -> Result<Value, AppError> {
        match name {
            "create_chess_game" => create_chess_game(state, agent_id, arguments).await,
            "make_chess_move" => make_chess_move(state, agent_id, arguments).await,
            "get_board_state" => get_board_state(state, agent_id, arguments).await,
            "analyze_position" => analyze_position(state, agent_id, arguments).await,
            "get_legal_moves" => get_legal_moves(state, agent_id, arguments).await,
            "get_move_hint" => get_move_hint(state, agent_id, arguments).await,
            "create_tournament" => create_tournament(state, agent_id, arguments).await,
            "get_tournament_status" => get_tournament_status(state, agent_id).await,
            other => Err(AppError::MethodNotFound(format!("unknown tool: {other}"))),
        }
    }
}

fn deserialize_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments).map_err(|e| AppError::InvalidParams(e.to_string()))
}

fn parse_color(raw: &str) -> Result<chess::PieceColor, AppError> {
    match raw {
        "white" => Ok(chess::PieceColor::White),
        "black" => Ok(chess::PieceColor::Black),
        other => Err(AppError::InvalidParams(format!("playerColor must be \"white\" or \"black\", got {other:?}"))),
    }
}

fn parse_difficulty(raw: Option<u8>) -> Result<u8, AppError> {
    let difficulty = raw.unwrap_or(5);
    if !(1..=10).contains(&difficulty) {
        return Err(AppError::InvalidParams(format!("difficulty must be in [1, 10], got {difficulty}")));
    }
    Ok(difficulty)
}

fn is_valid_session_id(session_id: &str) -> bool {
    session_id.starts_with("chess-session-") && session_id.len() > "chess-session-".len()
}

/// `^[a-h][1-8][a-h][1-8][qrbn]?$`, hand-rolled rather than pulled in via
/// `regex` since nothing else in the workspace needs a regex engine.
fn is_valid_uci_move(mv: &str) -> bool {
    let bytes = mv.as_bytes();
    if !(4..=5).contains(&bytes.len()) {
        return false;
    }
    let file = |b: u8| (b'a'..=b'h').contains(&b);
    let rank = |b: u8| (b'1'..=b'8').contains(&b);
    if !(file(bytes[0]) && rank(bytes[1]) && file(bytes[2]) && rank(bytes[3])) {
        return false;
    }
    bytes.len() == 4 || matches!(bytes[4], b'q' | b'r' | b'b' | b'n')
}

async fn resolve_owned_session(state: &AppState, agent_id: &str, session_id: &str) -> Result<SessionHandle, AppError> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;
    if handle.owner() != agent_id {
        return Err(AppError::Unauthorized);
    }
    Ok(handle)
}

pub(crate) fn snapshot_to_json(snapshot: &SessionSnapshot) -> Value {
    json!({
        "sessionId": snapshot.session_id,
        "aiOpponent": snapshot.ai_opponent,
        "playerColor": match snapshot.player_color { chess::PieceColor::White => "white", chess::PieceColor::Black => "black" },
        "difficulty": snapshot.difficulty,
        "createdAt": snapshot.created_at,
        "lastActivity": snapshot.last_activity,
        "movesPlayed": snapshot.moves_played,
        "averageThinkingTimeMs": snapshot.average_thinking_time_ms,
        "gameStatus": snapshot.status.as_str(),
        "fen": snapshot.fen,
    })
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CreateChessGameArgs {
    ai_opponent: String,
    player_color: String,
    difficulty: Option<u8>,
}

async fn create_chess_game(state: &AppState, agent_id: &str, arguments: Value) -> Result<Value, AppError> {
    let args: CreateChessGameArgs = deserialize_args(arguments)?;
    let color = parse_color(&args.player_color)?;
    let difficulty = parse_difficulty(args.difficulty)?;

    let snapshot = state.sessions.create(agent_id, &args.ai_opponent, color, difficulty).await.map_err(|e| match e {
        SessionManagerError::UnknownEngine(name) => AppError::UnknownEngine(name),
        SessionManagerError::SessionLimit => AppError::SessionLimit,
        SessionManagerError::SessionNotFound(id) => AppError::Internal(format!("session {id} vanished during creation")),
    })?;

    Ok(snapshot_to_json(&snapshot))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct MakeChessMoveArgs {
    session_id: String,
    #[serde(rename = "move")]
    mv: String,
}

async fn make_chess_move(state: &AppState, agent_id: &str, arguments: Value) -> Result<Value, AppError> {
    let args: MakeChessMoveArgs = deserialize_args(arguments)?;
    if !is_valid_session_id(&args.session_id) {
        return Err(AppError::InvalidParams("sessionId does not match ^chess-session-.+$".to_string()));
    }
    if !is_valid_uci_move(&args.mv) {
        return Err(AppError::InvalidParams("move does not match ^[a-h][1-8][a-h][1-8][qrbn]?$".to_string()));
    }

    let handle = resolve_owned_session(state, agent_id, &args.session_id).await?;
    let result = handle.make_move(args.mv).await.map_err(app_error_from_session)?;

    Ok(json!({
        "playerMove": result.player_move.uci,
        "aiMove": result.ai_move.map(|m| m.uci),
        "fen": result.fen,
        "gameStatus": result.status.as_str(),
        "thinkingMs": result.thinking_ms,
    }))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SessionIdOnlyArgs {
    session_id: String,
}

async fn get_board_state(state: &AppState, agent_id: &str, arguments: Value) -> Result<Value, AppError> {
    let args: SessionIdOnlyArgs = deserialize_args(arguments)?;
    let handle = resolve_owned_session(state, agent_id, &args.session_id).await?;
    let snapshot = handle.snapshot().await.map_err(app_error_from_session)?;
    Ok(snapshot_to_json(&snapshot))
}

async fn get_legal_moves(state: &AppState, agent_id: &str, arguments: Value) -> Result<Value, AppError> {
    let args: SessionIdOnlyArgs = deserialize_args(arguments)?;
    let handle = resolve_owned_session(state, agent_id, &args.session_id).await?;
    let moves = handle.legal_moves().await.map_err(app_error_from_session)?;
    Ok(json!({ "legalMoves": moves }))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct AnalyzePositionArgs {
    session_id: String,
    depth: Option<u8>,
}

async fn analyze_position(state: &AppState, agent_id: &str, arguments: Value) -> Result<Value, AppError> {
    let args: AnalyzePositionArgs = deserialize_args(arguments)?;
    if let Some(depth) = args.depth {
        if !(1..=10).contains(&depth) {
            return Err(AppError::InvalidParams(format!("depth must be in [1, 10], got {depth}")));
        }
    }
    let handle = resolve_owned_session(state, agent_id, &args.session_id).await?;
    let result = handle.analyze(args.depth).await.map_err(app_error_from_session)?;
    Ok(json!({ "bestMove": result.best_move, "evaluatedBy": result.evaluated_by }))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct GetMoveHintArgs {
    session_id: String,
    hint_level: Option<u8>,
}

async fn get_move_hint(state: &AppState, agent_id: &str, arguments: Value) -> Result<Value, AppError> {
    let args: GetMoveHintArgs = deserialize_args(arguments)?;
    if let Some(level) = args.hint_level {
        if !(1..=3).contains(&level) {
            return Err(AppError::InvalidParams(format!("hintLevel must be in [1, 3], got {level}")));
        }
    }
    let handle = resolve_owned_session(state, agent_id, &args.session_id).await?;
    let result = handle.hint(args.hint_level).await.map_err(app_error_from_session)?;
    Ok(json!({ "bestMove": result.best_move, "evaluatedBy": result.evaluated_by }))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CreateTournamentArgs {
    player_color: String,
    difficulty: Option<u8>,
}

/// Creates one session per registered engine, in parallel. Per §4.11
/// "partial failures reported per AI": an engine whose session creation
/// fails (most commonly `SessionLimit`, since twelve sessions at once push
/// past the default per-agent cap of 10) is reported inline rather than
/// failing the whole call.
async fn create_tournament(state: &AppState, agent_id: &str, arguments: Value) -> Result<Value, AppError> {
    let args: CreateTournamentArgs = deserialize_args(arguments)?;
    let color = parse_color(&args.player_color)?;
    let difficulty = parse_difficulty(args.difficulty)?;

    let tournament_id = format!("tournament-{}", crate::agent::short_nonce());

    let creations = engine::ENGINE_NAMES.iter().map(|name| async move {
        let outcome = state.sessions.create(agent_id, name, color, difficulty).await;
        (*name, outcome)
    });
    let results = futures_util::future::join_all(creations).await;

    let mut entries = Vec::with_capacity(results.len());
    for (name, outcome) in results {
        match outcome {
            Ok(snapshot) => entries.push(json!({ "aiOpponent": name, "sessionId": snapshot.session_id, "fen": snapshot.fen })),
            Err(e) => entries.push(json!({ "aiOpponent": name, "error": e.to_string() })),
        }
    }

    state
        .notifications
        .publish(
            agent_id,
            "notifications/chess/tournament_update",
            json!({ "tournamentId": tournament_id, "event": "created", "totals": { "requested": engine::ENGINE_NAMES.len() } }),
        )
        .await;

    Ok(json!({ "tournamentId": tournament_id, "sessions": entries }))
}

async fn get_tournament_status(state: &AppState, agent_id: &str) -> Result<Value, AppError> {
    let session_ids = state.sessions.agent_sessions(agent_id).await;
    let mut sessions = Vec::with_capacity(session_ids.len());
    for session_id in session_ids {
        if let Some(handle) = state.sessions.get(&session_id).await {
            if let Ok(snapshot) = handle.snapshot().await {
                sessions.push(snapshot_to_json(&snapshot));
            }
        }
    }
    Ok(json!({ "sessions": sessions }))
}

fn app_error_from_session(e: SessionError) -> AppError {
    match e {
        SessionError::IllegalMove { legal_moves } => {
            AppError::InvalidMove { message: "illegal move".to_string(), legal_moves: Some(legal_moves) }
        }
        SessionError::UnknownEngine(name) => AppError::UnknownEngine(name),
        SessionError::EngineTimeout => AppError::EngineTimeout,
        SessionError::TerminalGame => AppError::TerminalGame,
        SessionError::Poisoned => AppError::Internal("session is poisoned".to_string()),
        SessionError::Internal(msg) => AppError::Internal(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uci_validation_accepts_promotions_and_rejects_garbage() {
        assert!(is_valid_uci_move("e2e4"));
        assert!(is_valid_uci_move("a7a8q"));
        assert!(!is_valid_uci_move("e2e5x"));
        assert!(!is_valid_uci_move("i9i1"));
        assert!(!is_valid_uci_move("e2"));
    }

    #[test]
    fn session_id_validation_requires_the_documented_prefix() {
        assert!(is_valid_session_id("chess-session-agent-1-aaaaaaaa"));
        assert!(!is_valid_session_id("chess-session-"));
        assert!(!is_valid_session_id("not-a-session"));
    }

    #[test]
    fn difficulty_defaults_to_five_and_rejects_out_of_range() {
        assert_eq!(parse_difficulty(None).unwrap(), 5);
        assert!(parse_difficulty(Some(11)).is_err());
        assert!(parse_difficulty(Some(0)).is_err());
    }
}
