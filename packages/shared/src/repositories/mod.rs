pub mod errors;
pub mod game_repository;
pub mod memory_store;
pub mod player_directory;
pub mod table_store;
pub mod websocket_repository;
