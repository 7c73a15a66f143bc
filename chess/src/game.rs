//! `GameState` — board plus rights/counters (spec §4.2).
//!
//! Pure data with one pass-through operation, `try_move`, which composes
//! `RuleEvaluator::parse_uci` → `resolve_uci_move` → `apply` the way the
//! spec describes. `CastlingRights`/en-passant/counters are derived from the
//! FEN text on demand rather than duplicated as separate mutable fields —
//! `cozy_chess::Board`'s FEN round-trip (`chess::fen`) is already the
//! project's single source of truth for them.

use cozy_chess::{Board, Move, Piece};

use crate::rules::{GameOutcome, RuleEvaluator, RuleError};
use crate::types::PieceColor;

#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
}

/// WK, WQ, BK, BQ castling availability, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

/// Result of a successfully applied move.
#[derive(Debug, Clone)]
pub struct MoveApplication {
    pub new_state: GameState,
    pub mv: Move,
    pub uci: String,
    pub san: String,
    pub captured: Option<Piece>,
}

impl GameState {
    pub fn new() -> Self {
        Self { board: Board::default() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, RuleError> {
        Ok(Self { board: RuleEvaluator::parse_fen(fen)? })
    }

    pub fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_fen(&self) -> String {
        RuleEvaluator::to_fen(&self.board)
    }

    pub fn side_to_move(&self) -> PieceColor {
        RuleEvaluator::side_to_move(&self.board)
    }

    pub fn outcome(&self) -> GameOutcome {
        RuleEvaluator::outcome(&self.board)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.outcome(), GameOutcome::Active)
    }

    /// `{WK, WQ, BK, BQ}`, read from the FEN castling-availability field.
    pub fn castling_rights(&self) -> CastlingRights {
        let field = fen_field(&self.to_fen(), 2).unwrap_or("-");
        CastlingRights {
            white_kingside: field.contains('K'),
            white_queenside: field.contains('Q'),
            black_kingside: field.contains('k'),
            black_queenside: field.contains('q'),
        }
    }

    /// En-passant target square in algebraic notation, if any.
    pub fn en_passant_target(&self) -> Option<String> {
        match fen_field(&self.to_fen(), 3) {
            Some("-") | None => None,
            Some(sq) => Some(sq.to_string()),
        }
    }

    pub fn halfmove_clock(&self) -> u32 {
        fen_field(&self.to_fen(), 4)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    pub fn fullmove_number(&self) -> u32 {
        fen_field(&self.to_fen(), 5)
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        RuleEvaluator::legal_moves(&self.board)
    }

    /// Parse + validate + apply a UCI move string against this state.
    /// Promotion handling: a pawn push reaching the last rank without an
    /// explicit promotion letter is `IllegalMove` (the caller must spell it
    /// out, e.g. `e7e8q`) — see spec §4.2.
    pub fn try_move(&self, uci: &str) -> Result<MoveApplication, RuleError> {
        let mv = RuleEvaluator::resolve_uci_move(&self.board, uci)?;
        let piece = self.board.piece_on(mv.from).ok_or(RuleError::IllegalMove)?;
        let captured = self.board.piece_on(mv.to);
        let san = generate_san(&self.board, mv, piece);
        let new_board = RuleEvaluator::apply(&self.board, mv)?;

        Ok(MoveApplication {
            new_state: GameState::from_board(new_board),
            mv,
            uci: RuleEvaluator::format_uci(mv),
            san,
            captured,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

fn fen_field(fen: &str, index: usize) -> Option<&str> {
    fen.split_whitespace().nth(index)
}

/// Simplified SAN: piece letter (pawns use the origin file on captures),
/// capture marker, destination square, promotion suffix. Does not
/// disambiguate between identical pieces that can reach the same square —
/// acceptable for the notification/history payloads this feeds, which also
/// carry the UCI string.
pub(crate) fn generate_san(board: &Board, mv: Move, piece: Piece) -> String {
    let mut san = String::new();
    let is_capture = board.piece_on(mv.to).is_some();

    match piece {
        Piece::King => san.push('K'),
        Piece::Queen => san.push('Q'),
        Piece::Rook => san.push('R'),
        Piece::Bishop => san.push('B'),
        Piece::Knight => san.push('N'),
        Piece::Pawn if is_capture => san.push(crate::converters::format_file(mv.from.file())),
        Piece::Pawn => {}
    }

    if is_capture {
        san.push('x');
    }

    san.push_str(&crate::converters::format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(crate::converters::format_piece(promo).to_ascii_uppercase());
    }

    san
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_full_castling_rights() {
        let state = GameState::new();
        assert_eq!(
            state.castling_rights(),
            CastlingRights {
                white_kingside: true,
                white_queenside: true,
                black_kingside: true,
                black_queenside: true,
            }
        );
        assert_eq!(state.en_passant_target(), None);
        assert_eq!(state.halfmove_clock(), 0);
        assert_eq!(state.fullmove_number(), 1);
    }

    #[test]
    fn double_pawn_push_sets_en_passant_target() {
        let state = GameState::new();
        let applied = state.try_move("e2e4").unwrap();
        assert_eq!(applied.new_state.en_passant_target().as_deref(), Some("e3"));
        assert_eq!(applied.uci, "e2e4");
    }

    #[test]
    fn castling_rights_clear_after_king_move() {
        let state = GameState::from_fen(
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        )
        .unwrap();
        let applied = state.try_move("e1e2").unwrap();
        let rights = applied.new_state.castling_rights();
        assert!(!rights.white_kingside && !rights.white_queenside);
        assert!(rights.black_kingside && rights.black_queenside);
    }

    #[test]
    fn try_move_rejects_illegal_input() {
        let state = GameState::new();
        assert!(state.try_move("e2e5").is_err());
        assert!(state.try_move("garbage").is_err());
    }
}
