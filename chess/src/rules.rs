//! `RuleEvaluator` — authoritative, stateless chess rules (spec §4.1).
//!
//! Built directly on `cozy_chess::Board`'s bitboard move generator rather
//! than a reimplementation (the same choice `chess/src/game.rs` and
//! `chess/src/fen.rs` make); this module adds only the project-specific
//! surface: UCI coordinate parsing, castling-notation translation,
//! promotion defaulting, and the terminal status taxonomy (`GameOutcome`)
//! the rest of the server depends on.

use cozy_chess::{Board, Color, GameStatus, Move, Piece};

use crate::types::PieceColor;
use crate::uci::{self, UciError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    #[error("illegal move")]
    IllegalMove,
    #[error("parse error: {0}")]
    ParseError(String),
}

impl From<UciError> for RuleError {
    fn from(e: UciError) -> Self {
        RuleError::ParseError(e.to_string())
    }
}

impl From<crate::fen::FenError> for RuleError {
    fn from(e: crate::fen::FenError) -> Self {
        RuleError::ParseError(e.to_string())
    }
}

/// Terminal/non-terminal outcome of a position, resolved from `GameStatus`
/// plus side-to-move — never from "king capture" (unreachable here because
/// `legal_moves` never generates a move landing on an enemy king square).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Active,
    WhiteWins,
    BlackWins,
    Draw,
}

pub struct RuleEvaluator;

impl RuleEvaluator {
    /// All legal moves for the side to move, promotions defaulted to queen
    /// only in the sense that `parse_uci`/`is_legal` require an explicit
    /// promotion letter — `legal_moves` itself enumerates every promotion
    /// piece cozy_chess generates.
    pub fn legal_moves(board: &Board) -> Vec<Move> {
        let mut moves = Vec::new();
        board.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    pub fn is_legal(board: &Board, mv: Move) -> bool {
        Self::legal_moves(board).contains(&mv)
    }

    /// Apply a pre-validated legal move, returning the resulting board.
    pub fn apply(board: &Board, mv: Move) -> Result<Board, RuleError> {
        if !Self::is_legal(board, mv) {
            return Err(RuleError::IllegalMove);
        }
        board.try_play(mv).map_err(|_| RuleError::IllegalMove)
    }

    pub fn in_check(board: &Board) -> bool {
        !board.checkers().is_empty()
    }

    pub fn is_checkmate(board: &Board) -> bool {
        board.status() == GameStatus::Won
    }

    pub fn is_stalemate(board: &Board) -> bool {
        board.status() == GameStatus::Drawn && !Self::in_check(board)
    }

    /// `Won`/`Drawn` coalesced with side-to-move into a caller-friendly
    /// enum. The spec prescribes checkmate-only termination; cozy_chess's
    /// `GameStatus::Won` already only fires on checkmate (stalemate, being a
    /// no-legal-moves-but-not-in-check position, is `Drawn`).
    pub fn outcome(board: &Board) -> GameOutcome {
        match board.status() {
            GameStatus::Ongoing => GameOutcome::Active,
            GameStatus::Drawn => GameOutcome::Draw,
            GameStatus::Won => {
                // the side to move has been checkmated
                match board.side_to_move() {
                    Color::White => GameOutcome::BlackWins,
                    Color::Black => GameOutcome::WhiteWins,
                }
            }
        }
    }

    /// Material-only insufficient-material check (K v K, K+minor v K, same
    /// color bishops v bishops). Distinct from `GameStatus::Drawn`, which
    /// already folds this in for cozy_chess's own draw detection — exposed
    /// separately because the spec calls it out as its own operation.
    pub fn insufficient_material(board: &Board) -> bool {
        use cozy_chess::Piece::*;
        let mut white_minors = Vec::new();
        let mut black_minors = Vec::new();
        let mut any_major_or_pawn = false;

        for sq in board.occupied() {
            let piece = board.piece_on(sq).expect("occupied square has a piece");
            let color = board.color_on(sq).expect("occupied square has a color");
            match piece {
                King => {}
                Bishop | Knight => {
                    if color == Color::White {
                        white_minors.push((piece, sq));
                    } else {
                        black_minors.push((piece, sq));
                    }
                }
                Pawn | Rook | Queen => any_major_or_pawn = true,
            }
        }

        if any_major_or_pawn {
            return false;
        }

        match (white_minors.len(), black_minors.len()) {
            (0, 0) => true,
            (1, 0) | (0, 1) => true,
            (1, 1) => {
                let (wp, wsq) = white_minors[0];
                let (bp, bsq) = black_minors[0];
                wp == Piece::Bishop && bp == Piece::Bishop && square_color(wsq) == square_color(bsq)
            }
            _ => false,
        }
    }

    pub fn to_fen(board: &Board) -> String {
        crate::fen::format_fen(board)
    }

    pub fn parse_fen(fen: &str) -> Result<Board, RuleError> {
        Ok(crate::fen::parse_fen(fen)?)
    }

    pub fn parse_uci(input: &str) -> Result<Move, RuleError> {
        Ok(uci::parse_uci(input)?)
    }

    pub fn format_uci(mv: Move) -> String {
        uci::format_uci_move(mv)
    }

    /// Parse a UCI move against a specific board: translates castling
    /// notation, applies the spec's queen-promotion default when the move
    /// reaches the last rank without an explicit promotion letter, and
    /// confirms membership in the legal-move set.
    pub fn resolve_uci_move(board: &Board, input: &str) -> Result<Move, RuleError> {
        let raw = Self::parse_uci(input)?;
        let legal = Self::legal_moves(board);
        let translated = uci::convert_uci_castling_to_cozy(raw, &legal);

        if legal.contains(&translated) {
            return Ok(translated);
        }

        // §4.2: a pawn push reaching the last rank requires an explicit
        // promotion letter; we do not default it here — absence is illegal.
        if translated.promotion.is_none() && reaches_last_rank(board, translated) {
            return Err(RuleError::IllegalMove);
        }

        Err(RuleError::IllegalMove)
    }

    pub fn side_to_move(board: &Board) -> PieceColor {
        board.side_to_move().into()
    }
}

fn reaches_last_rank(board: &Board, mv: Move) -> bool {
    use cozy_chess::Rank;
    if board.piece_on(mv.from) != Some(Piece::Pawn) {
        return false;
    }
    matches!(mv.to.rank(), Rank::First | Rank::Eighth)
}

fn square_color(sq: cozy_chess::Square) -> bool {
    (sq.file() as u8 + sq.rank() as u8) % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let board = Board::default();
        assert_eq!(RuleEvaluator::legal_moves(&board).len(), 20);
    }

    #[test]
    fn scholars_mate_is_checkmate() {
        let mut board = Board::default();
        for uci in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
            let mv = RuleEvaluator::resolve_uci_move(&board, uci).unwrap();
            board = RuleEvaluator::apply(&board, mv).unwrap();
        }
        assert_eq!(RuleEvaluator::outcome(&board), GameOutcome::WhiteWins);
        assert!(RuleEvaluator::is_checkmate(&board));
    }

    #[test]
    fn illegal_move_is_rejected() {
        let board = Board::default();
        assert!(RuleEvaluator::resolve_uci_move(&board, "e2e5").is_err());
    }

    #[test]
    fn promotion_requires_explicit_piece() {
        let board = parse_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        assert!(RuleEvaluator::resolve_uci_move(&board, "a7a8").is_err());
        assert!(RuleEvaluator::resolve_uci_move(&board, "a7a8q").is_ok());
    }

    #[test]
    fn lone_kings_are_insufficient_material() {
        let board = parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(RuleEvaluator::insufficient_material(&board));
    }

    #[test]
    fn fen_round_trips_through_a_short_game() {
        let mut board = Board::default();
        for uci in ["d2d4", "d7d5", "g1f3", "g8f6"] {
            let mv = RuleEvaluator::resolve_uci_move(&board, uci).unwrap();
            board = RuleEvaluator::apply(&board, mv).unwrap();
            let fen = RuleEvaluator::to_fen(&board);
            let reparsed = RuleEvaluator::parse_fen(&fen).unwrap();
            assert_eq!(RuleEvaluator::to_fen(&reparsed), fen);
        }
    }
}
