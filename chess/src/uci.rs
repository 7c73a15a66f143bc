//! UCI (Universal Chess Interface) move encoding, per spec §4.1.
//!
//! Coordinate convention: file = `from.file() + 'a'`, rank = the board rank
//! digit directly (row 0 of the 8x8 array the protocol layer renders is rank
//! 8; `cozy_chess::Square` already tracks file/rank natively so no row/col
//! translation happens here — the row-0-is-rank-8 convention only matters to
//! the `GameState`/board-serialization layer the protocol exposes).

use cozy_chess::{File, Move, Piece, Rank, Square};

use crate::converters::{format_piece, format_square};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UciError {
    #[error("malformed UCI move: {0}")]
    Malformed(String),
}

/// Parse `"e2e4"` or `"e7e8q"` into a `Move`. Does not check legality — that
/// is `RuleEvaluator::is_legal`'s job — but does validate shape and that the
/// promotion letter (if present) names a real promotable piece.
pub fn parse_uci(input: &str) -> Result<Move, UciError> {
    let bytes = input.as_bytes();
    if !(4..=5).contains(&bytes.len()) {
        return Err(UciError::Malformed(input.to_string()));
    }

    let from = parse_square(&input[0..2])?;
    let to = parse_square(&input[2..4])?;
    let promotion = if bytes.len() == 5 {
        Some(parse_promotion(bytes[4] as char, input)?)
    } else {
        None
    };

    Ok(Move { from, to, promotion })
}

fn parse_square(s: &str) -> Result<Square, UciError> {
    let mut chars = s.chars();
    let file = match chars.next() {
        Some('a') => File::A,
        Some('b') => File::B,
        Some('c') => File::C,
        Some('d') => File::D,
        Some('e') => File::E,
        Some('f') => File::F,
        Some('g') => File::G,
        Some('h') => File::H,
        _ => return Err(UciError::Malformed(s.to_string())),
    };
    let rank = match chars.next() {
        Some('1') => Rank::First,
        Some('2') => Rank::Second,
        Some('3') => Rank::Third,
        Some('4') => Rank::Fourth,
        Some('5') => Rank::Fifth,
        Some('6') => Rank::Sixth,
        Some('7') => Rank::Seventh,
        Some('8') => Rank::Eighth,
        _ => return Err(UciError::Malformed(s.to_string())),
    };
    if chars.next().is_some() {
        return Err(UciError::Malformed(s.to_string()));
    }
    Ok(Square::new(file, rank))
}

fn parse_promotion(c: char, whole: &str) -> Result<Piece, UciError> {
    match c.to_ascii_lowercase() {
        'q' => Ok(Piece::Queen),
        'r' => Ok(Piece::Rook),
        'b' => Ok(Piece::Bishop),
        'n' => Ok(Piece::Knight),
        _ => Err(UciError::Malformed(whole.to_string())),
    }
}

/// Convert UCI castling notation (king moves two squares) to cozy_chess's
/// king-captures-rook notation, by matching against the current legal-move
/// set. Non-castling moves pass through unchanged.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let target_square = match (mv.from.rank(), mv.to.file()) {
            (Rank::First, File::G) => Square::new(File::H, Rank::First),
            (Rank::First, File::C) => Square::new(File::A, Rank::First),
            (Rank::Eighth, File::G) => Square::new(File::H, Rank::Eighth),
            (Rank::Eighth, File::C) => Square::new(File::A, Rank::Eighth),
            _ => return mv,
        };

        let converted = Move {
            from: mv.from,
            to: target_square,
            promotion: None,
        };

        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q").
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_a_quiet_move() {
        let mv = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(format_uci_move(mv), "e2e4");
    }

    #[test]
    fn formats_a_promotion() {
        let mv = Move {
            from: Square::new(File::E, Rank::Seventh),
            to: Square::new(File::E, Rank::Eighth),
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_uci_move(mv), "e7e8q");
    }

    #[test]
    fn round_trips_well_formed_uci() {
        for s in ["e2e4", "e7e8q", "a1h8", "g7g8n"] {
            let mv = parse_uci(s).unwrap();
            assert_eq!(format_uci_move(mv), s);
        }
    }

    #[test]
    fn rejects_malformed_uci() {
        for bad in ["", "e2", "e2e4qq", "i2e4", "e2e9"] {
            assert!(parse_uci(bad).is_err(), "expected {bad} to be rejected");
        }
    }
}
