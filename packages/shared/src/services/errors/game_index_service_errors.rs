use crate::repositories::errors::table_store_errors::TableStoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameIndexServiceError {
    Store(TableStoreError),
}

impl std::fmt::Display for GameIndexServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameIndexServiceError::Store(err) => write!(f, "Game index error: {}", err),
        }
    }
}

impl std::error::Error for GameIndexServiceError {}

impl From<TableStoreError> for GameIndexServiceError {
    fn from(err: TableStoreError) -> Self {
        GameIndexServiceError::Store(err)
    }
}
