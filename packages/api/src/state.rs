use std::sync::Arc;

use shared::services::game_service::GameService;
use shared::services::token_service::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub game_service: Arc<GameService>,
    pub token_service: Arc<TokenService>,
}

impl AppState {
    pub fn new(game_service: GameService, token_service: TokenService) -> Self {
        AppState {
            game_service: Arc::new(game_service),
            token_service: Arc::new(token_service),
        }
    }
}
