use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::services::errors::game_service_errors::GameServiceError;
use shared::services::errors::token_service_errors::TokenServiceError;

#[derive(Debug)]
pub enum ApiError {
    GameService(GameServiceError),
    TokenService(TokenServiceError),
    BadRequest(String),
    Unauthorized,
}

/// `application/problem+json` body. `instance` is a stable code clients can
/// match on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub title: String,
    pub detail: String,
    pub status: u16,
    pub instance: String,
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

impl From<TokenServiceError> for ApiError {
    fn from(error: TokenServiceError) -> Self {
        ApiError::TokenService(error)
    }
}

impl ApiError {
    fn classify(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            ApiError::GameService(err) => match err {
                GameServiceError::NotAParticipant => (
                    StatusCode::FORBIDDEN,
                    "Not a participant",
                    "game-not-participant",
                ),
                GameServiceError::NotYourTurn => {
                    (StatusCode::BAD_REQUEST, "Not your turn", "game-not-your-turn")
                }
                GameServiceError::IllegalMove(_) => {
                    (StatusCode::BAD_REQUEST, "Illegal move", "game-illegal-move")
                }
                GameServiceError::GameFinished => {
                    (StatusCode::BAD_REQUEST, "Game finished", "game-finished")
                }
                GameServiceError::AlreadyArchived => (
                    StatusCode::CONFLICT,
                    "Game already archived",
                    "game-already-archived",
                ),
                GameServiceError::ConcurrentUpdate => (
                    StatusCode::CONFLICT,
                    "Concurrent update",
                    "game-concurrent-update",
                ),
                GameServiceError::CorruptHistory(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Corrupt game history",
                    "game-corrupt-history",
                ),
                GameServiceError::OpponentNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "Opponent not found",
                    "game-opponent-not-found",
                ),
                GameServiceError::GameNotFound(_) => {
                    (StatusCode::NOT_FOUND, "Game not found", "game-not-found")
                }
                GameServiceError::ValidationError(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid request", "request-invalid")
                }
                GameServiceError::RepositoryError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage failure",
                    "storage-failure",
                ),
            },
            ApiError::TokenService(TokenServiceError::JwtError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Token failure",
                "request-unauthorized",
            ),
            ApiError::TokenService(_) | ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "request-unauthorized",
            ),
            ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "Invalid request", "request-invalid")
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::GameService(GameServiceError::RepositoryError(_)) => {
                "The game store is unavailable".to_string()
            }
            ApiError::GameService(err) => err.to_string(),
            ApiError::TokenService(err) => err.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Unauthorized => "A valid bearer token is required".to_string(),
        }
    }

    pub fn problem(&self) -> ProblemDetails {
        let (status, title, instance) = self.classify();
        ProblemDetails {
            title: title.to_string(),
            detail: self.detail(),
            status: status.as_u16(),
            instance: instance.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, _, _) = self.classify();
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self.problem()),
        )
            .into_response()
    }
}
