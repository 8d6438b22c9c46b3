use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenServiceError {
    JwtError(String),
    InvalidToken,
    ExpiredToken,
}

impl fmt::Display for TokenServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenServiceError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            TokenServiceError::InvalidToken => write!(f, "Invalid JWT token"),
            TokenServiceError::ExpiredToken => write!(f, "JWT token has expired"),
        }
    }
}

impl std::error::Error for TokenServiceError {}
