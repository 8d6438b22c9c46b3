#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStoreError {
    /// The write condition (absence or version) did not hold.
    PreconditionFailed,
    Serialization(String),
    Backend(String),
}

impl std::fmt::Display for TableStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableStoreError::PreconditionFailed => write!(f, "Write condition failed"),
            TableStoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            TableStoreError::Backend(msg) => write!(f, "Storage backend error: {}", msg),
        }
    }
}

impl std::error::Error for TableStoreError {}
