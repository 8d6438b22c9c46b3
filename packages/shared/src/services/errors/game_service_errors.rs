use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::player_directory_errors::PlayerDirectoryError;
use crate::services::errors::chess_service_errors::ChessServiceError;
use crate::services::errors::game_index_service_errors::GameIndexServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameServiceError {
    NotAParticipant,
    NotYourTurn,
    IllegalMove(String),
    GameFinished,
    AlreadyArchived,
    ConcurrentUpdate,
    CorruptHistory(String),
    OpponentNotFound(String),
    GameNotFound(String),
    ValidationError(String),
    RepositoryError(String),
}

impl GameServiceError {
    /// Only a lost optimistic write may be retried without asking the player.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameServiceError::ConcurrentUpdate)
    }
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::NotAParticipant => write!(f, "Player is not part of this game"),
            GameServiceError::NotYourTurn => write!(f, "It is not your turn"),
            GameServiceError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            GameServiceError::GameFinished => write!(f, "Game is already finished"),
            GameServiceError::AlreadyArchived => write!(f, "Game is already archived"),
            GameServiceError::ConcurrentUpdate => {
                write!(f, "Game was updated by another request, reload and retry")
            }
            GameServiceError::CorruptHistory(msg) => write!(f, "Corrupt move history: {}", msg),
            GameServiceError::OpponentNotFound(id) => write!(f, "Opponent {} not found", id),
            GameServiceError::GameNotFound(id) => write!(f, "Game {} not found", id),
            GameServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            GameServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<ChessServiceError> for GameServiceError {
    fn from(err: ChessServiceError) -> Self {
        match err {
            ChessServiceError::NotAParticipant => GameServiceError::NotAParticipant,
            ChessServiceError::GameFinished => GameServiceError::GameFinished,
            ChessServiceError::NotYourTurn => GameServiceError::NotYourTurn,
            ChessServiceError::IllegalMove(msg) => GameServiceError::IllegalMove(msg),
            ChessServiceError::CorruptHistory(msg) => GameServiceError::CorruptHistory(msg),
        }
    }
}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::ConcurrentUpdate => GameServiceError::ConcurrentUpdate,
            other => GameServiceError::RepositoryError(other.to_string()),
        }
    }
}

impl From<GameIndexServiceError> for GameServiceError {
    fn from(err: GameIndexServiceError) -> Self {
        GameServiceError::RepositoryError(err.to_string())
    }
}

impl From<PlayerDirectoryError> for GameServiceError {
    fn from(err: PlayerDirectoryError) -> Self {
        GameServiceError::RepositoryError(err.to_string())
    }
}
