pub mod converters;
pub mod fen;
pub mod game;
pub mod rules;
pub mod types;
pub mod uci;

pub use converters::*;
pub use fen::FenError;
pub use game::{CastlingRights, GameState, MoveApplication};
pub use rules::{GameOutcome, RuleError, RuleEvaluator};
pub use types::{PieceColor, PieceKind};
pub use uci::{convert_uci_castling_to_cozy, format_uci_move, parse_uci, UciError};

pub use cozy_chess::{Board, Color, Move, Piece, Square};
