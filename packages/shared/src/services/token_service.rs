use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::services::errors::token_service_errors::TokenServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenClaims {
    pub sub: String, // player id
    pub exp: usize,
    pub iat: usize,
}

/// Resolves bearer tokens to player identifiers.
#[derive(Clone)]
pub struct TokenService {
    jwt_secret: String,
}

impl TokenService {
    pub fn new(jwt_secret: &str) -> Self {
        TokenService {
            jwt_secret: jwt_secret.to_string(),
        }
    }

    pub fn issue_token(
        &self,
        player_id: &str,
        valid_for: Duration,
    ) -> Result<String, TokenServiceError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: player_id.to_string(),
            exp: (now + valid_for).timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| TokenServiceError::JwtError(format!("{:#?}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, TokenServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let validation = Validation::default();

        match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                let now = Utc::now().timestamp() as usize;
                if token_data.claims.exp < now {
                    Err(TokenServiceError::ExpiredToken)
                } else {
                    Ok(token_data.claims)
                }
            }
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(TokenServiceError::ExpiredToken)
                }
                _ => Err(TokenServiceError::InvalidToken),
            },
        }
    }

    pub fn player_id_from_token(&self, token: &str) -> Result<String, TokenServiceError> {
        let claims = self.verify_token(token)?;
        if claims.sub.is_empty() {
            return Err(TokenServiceError::InvalidToken);
        }
        Ok(claims.sub)
    }
}
