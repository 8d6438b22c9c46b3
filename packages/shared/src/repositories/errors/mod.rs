pub mod game_repository_errors;
pub mod player_directory_errors;
pub mod table_store_errors;
