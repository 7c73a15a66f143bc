//! Square/piece/color formatting shared by FEN, UCI, and notification payloads.

use cozy_chess::{Color, File, Piece, Rank, Square};

/// `e4`, `a1`, ... — file letter then rank digit.
pub fn format_square(square: Square) -> String {
    format!("{}{}", format_file(square.file()), format_rank(square.rank()))
}

pub fn format_file(file: File) -> char {
    match file {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

pub fn format_rank(rank: Rank) -> char {
    match rank {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    }
}

/// Lowercase UCI promotion letter (`q`, `r`, `b`, `n`).
pub fn format_piece(piece: Piece) -> char {
    match piece {
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        Piece::Pawn | Piece::King => unreachable!("pawns/kings are never promotion targets"),
    }
}

pub fn format_color(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}
