use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::{error::ApiError, state::AppState};

/// The player making the request, taken from the bearer token's subject.
#[derive(Debug, Clone)]
pub struct AuthenticatedPlayer {
    pub player_id: String,
}

impl FromRequestParts<AppState> for AuthenticatedPlayer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::Unauthorized)?
            .to_str()
            .map_err(|_| ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let player_id = state.token_service.player_id_from_token(token)?;

        Ok(AuthenticatedPlayer { player_id })
    }
}
