pub mod chess_service_errors;
pub mod game_index_service_errors;
pub mod game_service_errors;
pub mod token_service_errors;
