//! The `ChessEngine` capability, the twelve named stub engines that satisfy
//! it, and the registry/dispatcher that route search requests to them
//! (spec §4.3, §4.4).
//!
//! The twelve real engines (AlphaZero, LeelaChessZero, ...) are external
//! AI collaborators, not something this crate reimplements — the
//! implementations here are simple, deterministic heuristics whose job is
//! to satisfy `ChessEngine::search` well enough to drive the dispatcher and
//! session logic end to end.

pub mod dispatcher;
pub mod engines;
pub mod registry;

use std::time::{Duration, Instant};

use chess::{Board, Move};

pub use dispatcher::{EngineDispatcher, EngineLoad};
pub use registry::{EngineClass, EngineRegistry};

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("unknown engine: {0}")]
    UnknownEngine(String),
    #[error("engine search timed out")]
    Timeout,
    #[error("no legal moves available")]
    NoLegalMoves,
    #[error("engine task failed: {0}")]
    Internal(String),
}

/// Capability every AI backend must provide: given a position, a
/// difficulty in `[1, 10]`, and a wall-clock deadline, return the best move
/// found. Implementations must return *something* legal whenever legal
/// moves exist, even if the deadline is reached before a full search
/// completes.
pub trait ChessEngine: Send + Sync {
    fn name(&self) -> &'static str;
    fn class(&self) -> EngineClass;
    fn search(&self, board: &Board, difficulty: u8, deadline: Instant) -> Result<Move, EngineError>;
}

/// Search time budget for a given difficulty: `difficulty * 300ms`,
/// defaulting to 1500ms at the spec's default difficulty of 5.
pub fn deadline_for_difficulty(difficulty: u8) -> Duration {
    let difficulty = difficulty.clamp(1, 10);
    Duration::from_millis(u64::from(difficulty) * 300)
}

pub const ENGINE_NAMES: [&str; 12] = [
    "AlphaZero",
    "LeelaChessZero",
    "AlphaFold3",
    "A3C",
    "MCTS",
    "Negamax",
    "OpenAI",
    "QLearning",
    "DeepLearning",
    "CNN",
    "DQN",
    "Genetic",
];
