pub mod game;
pub mod game_index;
