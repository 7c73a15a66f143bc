//! FEN (Forsyth-Edwards Notation) encode/decode.
//!
//! `cozy_chess::Board` already implements a spec-compliant `FromStr`/`Display`
//! pair for FEN, including castling rights, en-passant target, and the
//! half-move/full-move counters, so this module is a thin, error-typed
//! wrapper rather than a reimplementation.

use cozy_chess::Board;

/// Parse a FEN string into a `Board`.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    fen.trim()
        .parse()
        .map_err(|_| FenError::InvalidFormat(fen.to_string()))
}

/// Format a `Board` as a FEN string.
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FenError {
    #[error("invalid FEN: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn round_trips_the_starting_position() {
        let board = parse_fen(STARTPOS).unwrap();
        assert_eq!(format_fen(&board), STARTPOS);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_fen("not a fen").is_err());
    }
}
