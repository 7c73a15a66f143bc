//! `ResourceRegistry` — the six `resources/read` URIs (spec §4.11).
//!
//! `chess://ai-systems`, `chess://opening-book`, `chess://training-stats`,
//! and `chess://tactical-patterns` are static reference data computed once
//! and returned verbatim. `chess://game-sessions` and
//! `chess://game-sessions/{sessionId}` are dynamic, agent-scoped views over
//! `SessionManager`.

use mcp_proto::AppError;
use serde_json::{json, Value};

use crate::AppState;

const GAME_SESSIONS_PREFIX: &str = "chess://game-sessions/";

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub async fn read(state: &AppState, agent_id: &str, uri: &str) -> Result<Value, AppError> {
        match uri {
            "chess://ai-systems" => Ok(ai_systems()),
            "chess://opening-book" => Ok(opening_book()),
            "chess://game-sessions" => agent_sessions(state, agent_id).await,
            "chess://training-stats" => Ok(training_stats()),
            "chess://tactical-patterns" => Ok(tactical_patterns()),
            uri if uri.starts_with(GAME_SESSIONS_PREFIX) => {
                let session_id = &uri[GAME_SESSIONS_PREFIX.len()..];
                single_session(state, agent_id, session_id).await
            }
            other => Err(AppError::InvalidParams(format!("unknown resource uri: {other}"))),
        }
    }
}

fn ai_systems() -> Value {
    let registry = engine::EngineRegistry::new();
    let engines: Vec<Value> = engine::ENGINE_NAMES
        .iter()
        .map(|name| {
            let class = registry.class_of(name).expect("every named engine is registered");
            json!({
                "name": name,
                "class": class_label(class),
                "poolSize": class.pool_size(),
            })
        })
        .collect();
    json!({ "engines": engines })
}

fn class_label(class: engine::EngineClass) -> &'static str {
    match class {
        engine::EngineClass::Neural => "neural",
        engine::EngineClass::Classical => "classical",
        engine::EngineClass::Learned => "learned",
    }
}

/// A short, well-known opening catalogue. Reference data only — the
/// dispatcher/session layer never consults this to choose moves.
fn opening_book() -> Value {
    json!({
        "openings": [
            { "eco": "C50", "name": "Italian Game", "moves": ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4"] },
            { "eco": "C60", "name": "Ruy Lopez", "moves": ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"] },
            { "eco": "B10", "name": "Caro-Kann Defense", "moves": ["e2e4", "c7c6"] },
            { "eco": "B20", "name": "Sicilian Defense", "moves": ["e2e4", "c7c5"] },
            { "eco": "D06", "name": "Queen's Gambit", "moves": ["d2d4", "d7d5", "c2c4"] },
            { "eco": "E20", "name": "Nimzo-Indian Defense", "moves": ["d2d4", "g8f6", "c2c4", "e7e6", "b1c3", "f8b4"] },
            { "eco": "A04", "name": "Reti Opening", "moves": ["g1f3"] },
        ]
    })
}

async fn agent_sessions(state: &AppState, agent_id: &str) -> Result<Value, AppError> {
    let session_ids = state.sessions.agent_sessions(agent_id).await;
    let mut sessions = Vec::with_capacity(session_ids.len());
    for session_id in session_ids {
        if let Some(handle) = state.sessions.get(&session_id).await {
            if let Ok(snapshot) = handle.snapshot().await {
                sessions.push(crate::tools::snapshot_to_json(&snapshot));
            }
        }
    }
    Ok(json!({ "sessions": sessions }))
}

async fn single_session(state: &AppState, agent_id: &str, session_id: &str) -> Result<Value, AppError> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;
    if handle.owner() != agent_id {
        return Err(AppError::Unauthorized);
    }
    let snapshot = handle.snapshot().await.map_err(|_| AppError::SessionNotFound(session_id.to_string()))?;
    Ok(crate::tools::snapshot_to_json(&snapshot))
}

fn training_stats() -> Value {
    json!({
        "note": "Static reference data; no training pipeline runs in this process.",
        "engines": engine::ENGINE_NAMES.iter().map(|name| json!({ "name": name, "gamesPlayed": 0, "winRate": null })).collect::<Vec<_>>(),
    })
}

fn tactical_patterns() -> Value {
    json!({
        "patterns": [
            { "name": "fork", "description": "One piece attacks two or more enemy pieces simultaneously." },
            { "name": "pin", "description": "A piece cannot move without exposing a more valuable piece behind it." },
            { "name": "skewer", "description": "An attack on a valuable piece that, once it moves, exposes a less valuable one." },
            { "name": "discovered_attack", "description": "Moving one piece unveils an attack from another." },
            { "name": "double_attack", "description": "A single move creates two distinct threats." },
            { "name": "back_rank_mate", "description": "Checkmate delivered against a king trapped on its back rank by its own pawns." },
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_systems_lists_all_twelve_engines() {
        let value = ai_systems();
        assert_eq!(value["engines"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn opening_book_entries_carry_legal_opening_moves() {
        let value = opening_book();
        assert!(!value["openings"].as_array().unwrap().is_empty());
    }
}
