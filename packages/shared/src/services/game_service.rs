use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::chess::Color;
use crate::models::game::{Game, Player, SpecialMove};
use crate::models::game_index::{GameListFilter, GamePartition};
use crate::repositories::game_repository::GameRepository;
use crate::repositories::player_directory::PlayerDirectory;
use crate::services::chess_service::ChessService;
use crate::services::errors::chess_service_errors::ChessServiceError;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::game_index_service::GameIndexService;
use crate::services::notification_service::Notifier;

pub const DEFAULT_INDEX_WRITE_ATTEMPTS: u32 = 3;

/// Outcome of deleting a game.
#[derive(Debug, Clone, PartialEq)]
pub enum GameDeletion {
    /// Withdrawn before the opponent moved; nothing is kept.
    Retracted,
    /// The requester resigned; the game is archived for both players.
    Resigned(Game),
}

/// The operations players perform on games. Every call reloads the game from
/// the repository; nothing is cached between requests.
#[derive(Clone)]
pub struct GameService {
    repository: Arc<dyn GameRepository>,
    index: GameIndexService,
    chess: ChessService,
    players: Arc<dyn PlayerDirectory>,
    notifier: Arc<dyn Notifier>,
    index_write_attempts: u32,
}

impl GameService {
    pub fn new(
        repository: Arc<dyn GameRepository>,
        index: GameIndexService,
        chess: ChessService,
        players: Arc<dyn PlayerDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        GameService {
            repository,
            index,
            chess,
            players,
            notifier,
            index_write_attempts: DEFAULT_INDEX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_index_write_attempts(mut self, attempts: u32) -> Self {
        self.index_write_attempts = attempts.max(1);
        self
    }

    /// Starts a game with the creator playing white.
    pub async fn create_game(
        &self,
        creator_id: &str,
        opponent_id: &str,
        name: &str,
    ) -> Result<Game, GameServiceError> {
        let opponent_id = opponent_id.trim();
        if opponent_id.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Opponent id cannot be empty".to_string(),
            ));
        }
        if opponent_id == creator_id {
            return Err(GameServiceError::ValidationError(
                "Cannot start a game against yourself".to_string(),
            ));
        }

        let opponent = self
            .players
            .find_player(opponent_id)
            .await?
            .ok_or_else(|| GameServiceError::OpponentNotFound(opponent_id.to_string()))?;
        let creator = self
            .players
            .find_player(creator_id)
            .await?
            .unwrap_or_else(|| Player::new(creator_id, creator_id));

        let name = match name.trim() {
            "" => format!("{} vs {}", creator.name, opponent.name),
            trimmed => trimmed.to_string(),
        };
        let game = Game::new(&name, creator, opponent);

        // Index first; an entry without a game is removed by the next listing.
        self.index.file_new_game(&game).await?;
        let game = self.repository.create_game(&game).await?;

        info!(
            "Created game {} between {} and {}",
            game.id, game.white.id, game.black.id
        );
        Ok(game)
    }

    /// Loads a game for one of its players. With `partition`, the game must
    /// also be filed there for the requester.
    pub async fn get_game(
        &self,
        requester: &str,
        game_id: &str,
        partition: Option<GamePartition>,
    ) -> Result<Game, GameServiceError> {
        let game = self.load(game_id).await?;
        if !game.is_participant(requester) {
            return Err(GameServiceError::NotAParticipant);
        }

        if let Some(partition) = partition {
            if self.index.find(requester, partition, game_id).await?.is_none() {
                return Err(GameServiceError::GameNotFound(game_id.to_string()));
            }
            if self.repair(&game, requester, partition).await != partition {
                return Err(GameServiceError::GameNotFound(game_id.to_string()));
            }
        }
        Ok(game)
    }

    /// Resolves the requester's index entries to games, newest first. Entries
    /// that disagree with their game are repaired on the way.
    pub async fn list_games(
        &self,
        requester: &str,
        filter: GameListFilter,
    ) -> Result<Vec<Game>, GameServiceError> {
        let partitions = filter.partitions();
        let mut seen = HashSet::new();
        let mut games = Vec::new();

        for &partition in &partitions {
            for entry in self.index.list(requester, partition).await? {
                let game = match self.repository.get_game(&entry.game_id).await? {
                    Some(game) if game.is_participant(requester) => game,
                    _ => {
                        if let Err(e) = self
                            .index
                            .remove_orphan(requester, partition, &entry.game_id)
                            .await
                        {
                            warn!("Failed to remove orphaned entry {}: {}", entry.game_id, e);
                        }
                        continue;
                    }
                };

                let expected = self.repair(&game, requester, partition).await;
                if partitions.contains(&expected) && seen.insert(game.id.clone()) {
                    games.push(game);
                }
            }
        }

        games.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(games)
    }

    /// Validates and records a move, then refiles both players and tells the
    /// opponent it is their turn.
    pub async fn add_move(
        &self,
        requester: &str,
        game_id: &str,
        notation: &str,
        special_move: SpecialMove,
        comment: &str,
    ) -> Result<Game, GameServiceError> {
        let game = self.load(game_id).await?;
        let previous_side_to_move = game.side_to_move();

        let updated = self
            .chess
            .submit_move(&game, requester, notation, special_move, comment, Utc::now())
            .map_err(|e| Self::rejected(game_id, e))?;
        let saved = self.repository.update_game(&updated).await?;

        info!(
            "Player {} played {} in game {} ({:?})",
            requester,
            saved.moves.last().map_or("", |m| m.notation.as_str()),
            saved.id,
            saved.state
        );

        self.refile(&saved, previous_side_to_move).await;
        if let Some(opponent) = saved.opponent_of(requester) {
            self.notify(&opponent.id, &saved.id, comment).await;
        }
        Ok(saved)
    }

    /// Retracts the game while no move has been played, otherwise resigns it
    /// on the requester's behalf.
    pub async fn delete_game(
        &self,
        requester: &str,
        game_id: &str,
    ) -> Result<GameDeletion, GameServiceError> {
        let game = self.load(game_id).await?;
        let color = game
            .color_of(requester)
            .ok_or(GameServiceError::NotAParticipant)?;
        if game.is_finished() {
            return Err(GameServiceError::AlreadyArchived);
        }

        if game.moves.is_empty() {
            // A move committed since `load` fails this delete.
            self.repository.delete_game(&game).await?;
            if let Err(e) = self.index.retract(&game).await {
                warn!("Failed to retract index entries for game {}: {}", game.id, e);
            }
            info!("Player {} retracted game {}", requester, game.id);
            return Ok(GameDeletion::Retracted);
        }

        let previous_side_to_move = game.side_to_move();
        let resigned = self
            .chess
            .resign(&game, requester, Utc::now())
            .map_err(|e| Self::rejected(game_id, e))?;
        let saved = self.repository.update_game(&resigned).await?;
        info!("Player {} resigned game {}", requester, saved.id);

        self.refile(&saved, previous_side_to_move).await;
        let opponent = game.player(color.opposite()).id.clone();
        self.notify(&opponent, &saved.id, &saved.state_text).await;
        Ok(GameDeletion::Resigned(saved))
    }

    pub async fn legal_moves(
        &self,
        requester: &str,
        game_id: &str,
    ) -> Result<Vec<String>, GameServiceError> {
        let game = self.load(game_id).await?;
        if !game.is_participant(requester) {
            return Err(GameServiceError::NotAParticipant);
        }
        self.chess
            .legal_moves(&game)
            .map_err(|e| Self::rejected(game_id, e))
    }

    /// Current position of a game in FEN.
    pub fn board_fen(&self, game: &Game) -> Result<String, GameServiceError> {
        self.chess
            .current_board(&game.moves)
            .map(|board| board.to_fen())
            .map_err(|e| Self::rejected(&game.id, e))
    }

    async fn load(&self, game_id: &str) -> Result<Game, GameServiceError> {
        self.repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))
    }

    fn rejected(game_id: &str, err: ChessServiceError) -> GameServiceError {
        if let ChessServiceError::CorruptHistory(detail) = &err {
            error!("Integrity fault in game {}: {}", game_id, detail);
        }
        err.into()
    }

    /// Repairs the requester's entry and returns where it belongs. Failures
    /// are logged; the next read tries again.
    async fn repair(
        &self,
        game: &Game,
        player_id: &str,
        found_in: GamePartition,
    ) -> GamePartition {
        match self.index.repair(game, player_id, found_in).await {
            Ok(partition) => partition,
            Err(e) => {
                warn!("Failed to repair index for game {}: {}", game.id, e);
                GameIndexService::expected_partition(game, player_id)
            }
        }
    }

    async fn refile(&self, game: &Game, previous_side_to_move: Color) {
        for attempt in 1..=self.index_write_attempts {
            match self.index.refile(game, previous_side_to_move).await {
                Ok(()) => return,
                Err(e) if attempt < self.index_write_attempts => {
                    warn!(
                        "Refiling game {} failed (attempt {}): {}",
                        game.id, attempt, e
                    );
                }
                Err(e) => {
                    error!(
                        "Giving up refiling game {} after {} attempts: {}",
                        game.id, attempt, e
                    );
                }
            }
        }
    }

    async fn notify(&self, player_id: &str, game_id: &str, comment: &str) {
        if let Err(e) = self.notifier.notify(player_id, game_id, comment).await {
            warn!(
                "Failed to notify player {} about game {}: {}",
                player_id, game_id, e
            );
        }
    }
}
