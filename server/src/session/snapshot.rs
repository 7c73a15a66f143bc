//! `SessionSnapshot` — the immutable view of a session's state handed
//! back to callers on every read and mutation (spec §3, §4.5).

use super::commands::{MoveRecord, SessionStatus};

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub agent_id: String,
    pub ai_opponent: String,
    pub player_color: chess::PieceColor,
    pub difficulty: u8,
    pub created_at: i64,
    pub last_activity: i64,
    pub moves_played: u32,
    pub average_thinking_time_ms: f64,
    pub status: SessionStatus,
    pub fen: String,
    pub history: Vec<MoveRecord>,
}

impl SessionSnapshot {
    pub fn is_owned_by(&self, agent_id: &str) -> bool {
        self.agent_id == agent_id
    }
}
