use crate::repositories::errors::table_store_errors::TableStoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameRepositoryError {
    AlreadyExists,
    /// The stored game changed since it was read.
    ConcurrentUpdate,
    Serialization(String),
    Store(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::AlreadyExists => write!(f, "Game already exists"),
            GameRepositoryError::ConcurrentUpdate => {
                write!(f, "Game was modified by another request")
            }
            GameRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            GameRepositoryError::Store(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for GameRepositoryError {}

impl From<TableStoreError> for GameRepositoryError {
    fn from(err: TableStoreError) -> Self {
        match err {
            TableStoreError::Serialization(msg) => GameRepositoryError::Serialization(msg),
            other => GameRepositoryError::Store(other.to_string()),
        }
    }
}
