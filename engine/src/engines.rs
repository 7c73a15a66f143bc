//! Heuristic `ChessEngine` implementations.
//!
//! Every named engine in [`crate::ENGINE_NAMES`] is realized as a
//! [`HeuristicEngine`] parameterized by a [`Strategy`] — there is no need
//! for twelve distinct structs when the observable contract (return a legal
//! move before the deadline, prefer better ones when time allows) is the
//! same for all of them.

use std::time::Instant;

use chess::{Board, Move, Piece, RuleEvaluator};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::registry::EngineClass;
use crate::{ChessEngine, EngineError};

#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Fixed-depth negamax with alpha-beta pruning over material + simple
    /// mobility, depth scaled by difficulty.
    Negamax,
    /// Always takes the highest-value capture available; otherwise plays
    /// the first legal move in generation order.
    GreedyCapture,
    /// Samples `rollouts` random legal moves and picks the one whose
    /// resulting position has the best immediate material balance.
    RandomRollout { rollouts: u32 },
}

pub struct HeuristicEngine {
    name: &'static str,
    class: EngineClass,
    strategy: Strategy,
}

impl HeuristicEngine {
    pub fn new(name: &'static str, class: EngineClass, strategy: Strategy) -> Self {
        Self { name, class, strategy }
    }
}

impl ChessEngine for HeuristicEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn class(&self) -> EngineClass {
        self.class
    }

    fn search(&self, board: &Board, difficulty: u8, deadline: Instant) -> Result<Move, EngineError> {
        let legal = RuleEvaluator::legal_moves(board);
        if legal.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        let chosen = match self.strategy {
            Strategy::GreedyCapture => greedy_capture(board, &legal),
            Strategy::RandomRollout { rollouts } => random_rollout(board, &legal, rollouts, deadline),
            Strategy::Negamax => negamax_root(board, &legal, depth_for_difficulty(difficulty), deadline),
        };

        Ok(chosen.unwrap_or(legal[0]))
    }
}

fn depth_for_difficulty(difficulty: u8) -> u8 {
    // difficulty 1 -> depth 1, difficulty 10 -> depth 4; kept shallow since
    // this runs synchronously inside a spawn_blocking task under a deadline.
    1 + (difficulty.clamp(1, 10) - 1) / 3
}

fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

fn material_balance(board: &Board, perspective: cozy_chess::Color) -> i32 {
    let mut score = 0;
    for sq in board.occupied() {
        let piece = board.piece_on(sq).expect("occupied square has a piece");
        let color = board.color_on(sq).expect("occupied square has a color");
        let value = piece_value(piece);
        score += if color == perspective { value } else { -value };
    }
    score
}

fn greedy_capture(board: &Board, legal: &[Move]) -> Option<Move> {
    legal
        .iter()
        .copied()
        .max_by_key(|mv| board.piece_on(mv.to).map(piece_value).unwrap_or(-1))
}

fn random_rollout(board: &Board, legal: &[Move], rollouts: u32, deadline: Instant) -> Option<Move> {
    let mut rng = rand::thread_rng();
    let perspective = board.side_to_move();
    let mut best: Option<(Move, i32)> = None;

    let samples = legal.len().min(rollouts.max(1) as usize);
    let mut candidates: Vec<Move> = legal.to_vec();
    candidates.shuffle(&mut rng);

    for &mv in candidates.iter().take(samples) {
        if Instant::now() >= deadline {
            break;
        }
        let Ok(after) = board.try_play(mv) else { continue };
        let score = material_balance(&after, perspective) + rng.gen_range(-10..=10);
        if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
            best = Some((mv, score));
        }
    }

    best.map(|(mv, _)| mv)
}

fn negamax_root(board: &Board, legal: &[Move], depth: u8, deadline: Instant) -> Option<Move> {
    let mut best: Option<(Move, i32)> = None;

    for &mv in legal {
        if Instant::now() >= deadline {
            break;
        }
        let Ok(after) = board.try_play(mv) else { continue };
        let score = -negamax(&after, depth.saturating_sub(1), i32::MIN + 1, i32::MAX, deadline);
        if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
            best = Some((mv, score));
        }
    }

    best.map(|(mv, _)| mv)
}

fn negamax(board: &Board, depth: u8, mut alpha: i32, beta: i32, deadline: Instant) -> i32 {
    if depth == 0 || Instant::now() >= deadline {
        return material_balance(board, board.side_to_move());
    }

    let moves = RuleEvaluator::legal_moves(board);
    if moves.is_empty() {
        return if RuleEvaluator::in_check(board) {
            i32::MIN + 1000
        } else {
            0
        };
    }

    let mut best = i32::MIN + 1;
    for mv in moves {
        let Ok(after) = board.try_play(mv) else { continue };
        let score = -negamax(&after, depth - 1, -beta, -alpha, deadline);
        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best
}
