//! Chess rules: position representation, legal move generation, check and
//! game-end detection. Everything here is pure and synchronous.

pub mod board;
pub mod errors;
pub mod movegen;
pub mod notation;
pub mod types;

pub use board::{Board, BoardStatus, CastlingRights, STARTING_FEN};
pub use errors::ChessError;
pub use notation::MoveNotation;
pub use types::{ChessMove, Color, Piece, PieceKind, Square};
