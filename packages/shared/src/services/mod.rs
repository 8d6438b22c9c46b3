pub mod chess_service;
pub mod errors;
pub mod game_index_service;
pub mod game_service;
pub mod notification_service;
pub mod token_service;
