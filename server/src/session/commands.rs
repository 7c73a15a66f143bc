//! Commands accepted by a session actor, and the session-local error/result
//! types that ride along on their oneshot replies (spec §4.5).

use tokio::sync::oneshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("invalid move")]
    IllegalMove { legal_moves: Vec<String> },
    #[error("unknown engine: {0}")]
    UnknownEngine(String),
    #[error("engine search timed out")]
    EngineTimeout,
    #[error("game has already ended")]
    TerminalGame,
    #[error("session state is corrupted and can no longer accept operations")]
    Poisoned,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveBy {
    Player,
    Ai,
}

#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub uci: String,
    pub san: String,
    pub by: MoveBy,
    pub thinking_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    WhiteWins,
    BlackWins,
    Draw,
    Resigned,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::WhiteWins => "white_wins",
            SessionStatus::BlackWins => "black_wins",
            SessionStatus::Draw => "draw",
            SessionStatus::Resigned => "resigned",
        }
    }
}

impl From<chess::GameOutcome> for SessionStatus {
    fn from(outcome: chess::GameOutcome) -> Self {
        match outcome {
            chess::GameOutcome::Active => SessionStatus::Active,
            chess::GameOutcome::WhiteWins => SessionStatus::WhiteWins,
            chess::GameOutcome::BlackWins => SessionStatus::BlackWins,
            chess::GameOutcome::Draw => SessionStatus::Draw,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoveResult {
    pub player_move: MoveRecord,
    pub ai_move: Option<MoveRecord>,
    pub fen: String,
    pub status: SessionStatus,
    pub thinking_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub best_move: String,
    pub evaluated_by: String,
}

pub enum SessionCommand {
    MakeMove {
        uci: String,
        reply: oneshot::Sender<Result<MoveResult, SessionError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<super::snapshot::SessionSnapshot>,
    },
    GetLegalMoves {
        reply: oneshot::Sender<Vec<String>>,
    },
    Analyze {
        depth: Option<u8>,
        reply: oneshot::Sender<Result<AnalysisResult, SessionError>>,
    },
    Hint {
        hint_level: Option<u8>,
        reply: oneshot::Sender<Result<AnalysisResult, SessionError>>,
    },
    /// Internal-only: applied once at session creation when the AI plays
    /// white, per spec §4.5 `openingMove()`. Never reachable from a tool.
    OpeningMove {
        reply: oneshot::Sender<Result<Option<MoveRecord>, SessionError>>,
    },
    Shutdown,
}

impl From<engine::EngineError> for SessionError {
    fn from(e: engine::EngineError) -> Self {
        match e {
            engine::EngineError::Timeout => SessionError::EngineTimeout,
            engine::EngineError::UnknownEngine(name) => SessionError::UnknownEngine(name),
            engine::EngineError::NoLegalMoves => SessionError::TerminalGame,
            engine::EngineError::Internal(msg) => SessionError::Internal(msg),
        }
    }
}
