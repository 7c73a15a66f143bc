//! `SessionState` — the mutable state a session actor owns exclusively
//! (spec §4.5). No locks: the actor task is the only thing that ever
//! touches this struct, so "only the thread holding the session's lock
//! may mutate its `GameState`" (spec §3) holds structurally rather than
//! by runtime enforcement.

use std::time::Instant;

use chess::{GameState, RuleEvaluator};

use super::commands::{AnalysisResult, MoveBy, MoveRecord, MoveResult, SessionError, SessionStatus};
use super::deps::SessionDeps;
use super::snapshot::SessionSnapshot;

pub(crate) struct SessionState {
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
    pub game: GameState,
    pub history: Vec<MoveRecord>,
    pub poisoned: bool,
    pub deps: SessionDeps,
}

impl SessionState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: String,
        agent_id: String,
        ai_opponent: String,
        player_color: chess::PieceColor,
        difficulty: u8,
        now: i64,
        deps: SessionDeps,
    ) -> Self {
        Self {
            session_id,
            agent_id,
            ai_opponent,
            player_color,
            difficulty,
            created_at: now,
            last_activity: now,
            moves_played: 0,
            average_thinking_time_ms: 0.0,
            status: SessionStatus::Active,
            game: GameState::new(),
            history: Vec::new(),
            poisoned: false,
            deps,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            agent_id: self.agent_id.clone(),
            ai_opponent: self.ai_opponent.clone(),
            player_color: self.player_color,
            difficulty: self.difficulty,
            created_at: self.created_at,
            last_activity: self.last_activity,
            moves_played: self.moves_played,
            average_thinking_time_ms: self.average_thinking_time_ms,
            status: self.status,
            fen: self.game.to_fen(),
            history: self.history.clone(),
        }
    }

    pub fn legal_moves(&self) -> Vec<String> {
        self.game.legal_moves().into_iter().map(RuleEvaluator::format_uci).collect()
    }

    /// `ai_plays_white() && moves_played == 0` — spec §4.5 `openingMove()`.
    pub fn ai_plays_white(&self) -> bool {
        self.player_color == chess::PieceColor::Black
    }

    /// Apply the single AI-opening move when the AI plays white and no
    /// move has been made yet. Never reachable through a tool call.
    pub async fn opening_move(&mut self) -> Result<Option<MoveRecord>, SessionError> {
        if self.poisoned {
            return Err(SessionError::Poisoned);
        }
        if self.moves_played != 0 || !self.ai_plays_white() {
            return Ok(None);
        }

        let board = self.game.board().clone();
        let started = Instant::now();
        let ai_mv = self.deps.engine_dispatcher.dispatch(&self.ai_opponent, board, self.difficulty).await?;
        let thinking_ms = started.elapsed().as_millis() as u64;
        let ai_uci = RuleEvaluator::format_uci(ai_mv);

        let applied = self.game.try_move(&ai_uci).map_err(|_| {
            self.poisoned = true;
            SessionError::Poisoned
        })?;

        let record = MoveRecord { uci: ai_uci, san: applied.san.clone(), by: MoveBy::Ai, thinking_time_ms: Some(thinking_ms) };
        self.commit_one(applied.new_state, record.clone());
        self.update_average_thinking(thinking_ms);
        Ok(Some(record))
    }

    /// `makeMove` — spec §4.5. Player move and AI reply are only
    /// committed to `self` together, after the AI search succeeds, so an
    /// `EngineTimeout` leaves the session exactly as it was (§3
    /// failure-semantics: "state unchanged").
    pub async fn make_move(&mut self, uci: &str) -> Result<MoveResult, SessionError> {
        if self.poisoned {
            return Err(SessionError::Poisoned);
        }
        if self.status.is_terminal() {
            return Err(SessionError::TerminalGame);
        }

        let applied = self.game.try_move(uci).map_err(|_| SessionError::IllegalMove { legal_moves: self.legal_moves() })?;
        let player_record = MoveRecord { uci: applied.uci.clone(), san: applied.san.clone(), by: MoveBy::Player, thinking_time_ms: None };

        let status_after_player = SessionStatus::from(applied.new_state.outcome());
        if status_after_player.is_terminal() {
            self.commit_one(applied.new_state, player_record.clone());
            self.status = status_after_player;
            return Ok(MoveResult {
                player_move: player_record,
                ai_move: None,
                fen: self.game.to_fen(),
                status: self.status,
                thinking_ms: None,
            });
        }

        let board = applied.new_state.board().clone();
        let started = Instant::now();
        let ai_mv = self.deps.engine_dispatcher.dispatch(&self.ai_opponent, board, self.difficulty).await?;
        let thinking_ms = started.elapsed().as_millis() as u64;
        let ai_uci = RuleEvaluator::format_uci(ai_mv);

        let after_ai = applied.new_state.try_move(&ai_uci).map_err(|_| {
            self.poisoned = true;
            SessionError::Poisoned
        })?;

        let ai_record = MoveRecord { uci: ai_uci, san: after_ai.san.clone(), by: MoveBy::Ai, thinking_time_ms: Some(thinking_ms) };
        self.history.push(player_record.clone());
        self.commit_one(after_ai.new_state, ai_record.clone());
        self.update_average_thinking(thinking_ms);

        Ok(MoveResult {
            player_move: player_record,
            ai_move: Some(ai_record),
            fen: self.game.to_fen(),
            status: self.status,
            thinking_ms: Some(thinking_ms),
        })
    }

    /// Read-only engine search against a board clone; never mutates `self`.
    pub async fn analyze(&self, depth: Option<u8>) -> Result<AnalysisResult, SessionError> {
        if self.poisoned {
            return Err(SessionError::Poisoned);
        }
        let difficulty = depth.unwrap_or(3).clamp(1, 10);
        let board = self.game.board().clone();
        let mv = self.deps.engine_dispatcher.dispatch(&self.ai_opponent, board, difficulty).await?;
        Ok(AnalysisResult { best_move: RuleEvaluator::format_uci(mv), evaluated_by: self.ai_opponent.clone() })
    }

    /// Read-only engine search at a shallow, hint-appropriate deadline;
    /// never mutates `self`.
    pub async fn hint(&self, hint_level: Option<u8>) -> Result<AnalysisResult, SessionError> {
        if self.poisoned {
            return Err(SessionError::Poisoned);
        }
        let difficulty = hint_level.unwrap_or(1).clamp(1, 3);
        let board = self.game.board().clone();
        let mv = self.deps.engine_dispatcher.dispatch(&self.ai_opponent, board, difficulty).await?;
        Ok(AnalysisResult { best_move: RuleEvaluator::format_uci(mv), evaluated_by: self.ai_opponent.clone() })
    }

    fn commit_one(&mut self, new_state: GameState, record: MoveRecord) {
        self.game = new_state;
        self.status = SessionStatus::from(self.game.outcome());
        self.history.push(record);
        self.moves_played += 1;
        self.last_activity = now();
    }

    fn update_average_thinking(&mut self, thinking_ms: u64) {
        let ai_moves = self.history.iter().filter(|m| m.by == MoveBy::Ai).count().max(1) as f64;
        self.average_thinking_time_ms += (thinking_ms as f64 - self.average_thinking_time_ms) / ai_moves;
    }
}

fn now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationBus;
    use std::sync::Arc;

    fn test_deps() -> SessionDeps {
        SessionDeps {
            engine_dispatcher: Arc::new(EngineDispatcher::new(Arc::new(engine::EngineRegistry::new()))),
            notification_bus: Arc::new(NotificationBus::new()),
        }
    }

    use engine::EngineDispatcher;

    fn test_state(player_color: chess::PieceColor) -> SessionState {
        SessionState::new(
            "chess-session-agent-1-aaaaaaaa".to_string(),
            "agent-1".to_string(),
            "Negamax".to_string(),
            player_color,
            2,
            0,
            test_deps(),
        )
    }

    #[tokio::test]
    async fn make_move_rejects_illegal_input() {
        let mut state = test_state(chess::PieceColor::White);
        let err = state.make_move("e2e5").await.unwrap_err();
        assert!(matches!(err, SessionError::IllegalMove { .. }));
    }

    #[tokio::test]
    async fn legal_move_produces_an_ai_reply_and_advances_history() {
        let mut state = test_state(chess::PieceColor::White);
        let result = state.make_move("e2e4").await.unwrap();
        assert_eq!(result.player_move.uci, "e2e4");
        assert!(result.ai_move.is_some());
        assert_eq!(state.moves_played, 2);
        assert_eq!(state.history.len(), 2);
    }

    #[tokio::test]
    async fn opening_move_plays_once_when_ai_has_white() {
        let mut state = test_state(chess::PieceColor::Black);
        let opening = state.opening_move().await.unwrap();
        assert!(opening.is_some());
        assert_eq!(state.moves_played, 1);

        let again = state.opening_move().await.unwrap();
        assert!(again.is_none(), "opening move must not repeat past the first ply");
    }

    #[tokio::test]
    async fn moves_after_terminal_status_are_rejected() {
        let mut state = test_state(chess::PieceColor::White);
        state.status = SessionStatus::WhiteWins;
        let err = state.make_move("e2e4").await.unwrap_err();
        assert!(matches!(err, SessionError::TerminalGame));
    }

    #[tokio::test]
    async fn analyze_and_hint_do_not_mutate_state() {
        let state = test_state(chess::PieceColor::White);
        let fen_before = state.game.to_fen();
        let _ = state.analyze(Some(2)).await.unwrap();
        let _ = state.hint(Some(1)).await.unwrap();
        assert_eq!(state.game.to_fen(), fen_before);
    }
}
