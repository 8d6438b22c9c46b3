use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    IllegalMove(String),
    InvalidNotation(String),
    InvalidFen(String),
}

impl fmt::Display for ChessError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChessError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            ChessError::InvalidNotation(msg) => write!(f, "Invalid notation: {}", msg),
            ChessError::InvalidFen(msg) => write!(f, "Invalid FEN: {}", msg),
        }
    }
}

impl std::error::Error for ChessError {}
