#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerDirectoryError {
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for PlayerDirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerDirectoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            PlayerDirectoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for PlayerDirectoryError {}
