#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessServiceError {
    NotAParticipant,
    GameFinished,
    NotYourTurn,
    IllegalMove(String),
    /// A stored move does not replay against the position before it.
    CorruptHistory(String),
}

impl std::fmt::Display for ChessServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChessServiceError::NotAParticipant => write!(f, "Player is not part of this game"),
            ChessServiceError::GameFinished => write!(f, "Game is already finished"),
            ChessServiceError::NotYourTurn => write!(f, "It is not your turn"),
            ChessServiceError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            ChessServiceError::CorruptHistory(msg) => write!(f, "Corrupt move history: {}", msg),
        }
    }
}

impl std::error::Error for ChessServiceError {}
