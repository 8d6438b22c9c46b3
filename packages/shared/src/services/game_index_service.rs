use std::sync::Arc;
use tracing::{debug, warn};

use crate::chess::Color;
use crate::models::game::Game;
use crate::models::game_index::{GamePartition, IndexEntry};
use crate::repositories::table_store::{Table, TableRecord, TableStore, WriteCondition};
use crate::services::errors::game_index_service_errors::GameIndexServiceError;

const WAITING: [GamePartition; 2] = [
    GamePartition::WaitingForYou,
    GamePartition::WaitingForOpponent,
];

/// Keeps each player's WaitingForYou / WaitingForOpponent / Archive entries in
/// line with the games they point at.
///
/// The store has no multi-key transactions, so every move between partitions
/// writes the new entry before deleting the old one. An interrupted refile
/// leaves a duplicate, never a missing entry; readers heal duplicates with
/// [`GameIndexService::repair`] using the game's own state as ground truth.
/// Nothing here retries.
#[derive(Clone)]
pub struct GameIndexService {
    store: Arc<dyn TableStore>,
}

impl GameIndexService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        GameIndexService { store }
    }

    /// Where `player_id`'s entry for `game` belongs.
    pub fn expected_partition(game: &Game, player_id: &str) -> GamePartition {
        if game.is_finished() {
            GamePartition::Archive
        } else if game.player(game.side_to_move()).id == player_id {
            GamePartition::WaitingForYou
        } else {
            GamePartition::WaitingForOpponent
        }
    }

    pub async fn file_new_game(&self, game: &Game) -> Result<(), GameIndexServiceError> {
        for player in [&game.white, &game.black] {
            let partition = Self::expected_partition(game, &player.id);
            self.file(&game.id, &player.id, partition).await?;
        }
        debug!("Filed new game {}", game.id);
        Ok(())
    }

    /// Moves both players' entries after the side `previous_side_to_move`
    /// moved or the game ended.
    pub async fn refile(
        &self,
        game: &Game,
        previous_side_to_move: Color,
    ) -> Result<(), GameIndexServiceError> {
        let mover = &game.player(previous_side_to_move).id;
        let opponent = &game.player(previous_side_to_move.opposite()).id;

        if game.is_finished() {
            for player in [mover, opponent] {
                self.file(&game.id, player, GamePartition::Archive).await?;
            }
            for player in [mover, opponent] {
                for partition in WAITING {
                    self.unfile(&game.id, player, partition).await?;
                }
            }
            debug!("Archived game {}", game.id);
            return Ok(());
        }

        self.file(&game.id, mover, GamePartition::WaitingForOpponent)
            .await?;
        self.file(&game.id, opponent, GamePartition::WaitingForYou)
            .await?;
        self.unfile(&game.id, mover, GamePartition::WaitingForYou)
            .await?;
        self.unfile(&game.id, opponent, GamePartition::WaitingForOpponent)
            .await?;
        debug!("Refiled game {} after {} moved", game.id, previous_side_to_move);
        Ok(())
    }

    /// Removes every waiting entry for a game that is being withdrawn. No
    /// archive entry is written.
    pub async fn retract(&self, game: &Game) -> Result<(), GameIndexServiceError> {
        for player in [&game.white, &game.black] {
            for partition in WAITING {
                self.unfile(&game.id, &player.id, partition).await?;
            }
        }
        debug!("Retracted game {}", game.id);
        Ok(())
    }

    pub async fn list(
        &self,
        player_id: &str,
        partition: GamePartition,
    ) -> Result<Vec<IndexEntry>, GameIndexServiceError> {
        let records = self
            .store
            .get_all(Table::for_partition(partition), player_id)
            .await?;
        records
            .iter()
            .map(|record| record.to_value().map_err(GameIndexServiceError::from))
            .collect()
    }

    pub async fn find(
        &self,
        player_id: &str,
        partition: GamePartition,
        game_id: &str,
    ) -> Result<Option<IndexEntry>, GameIndexServiceError> {
        match self
            .store
            .get(Table::for_partition(partition), player_id, game_id)
            .await?
        {
            Some(record) => Ok(Some(record.to_value()?)),
            None => Ok(None),
        }
    }

    /// Moves an entry found in `found_in` to where `game` says it belongs and
    /// returns that partition. Safe to repeat.
    pub async fn repair(
        &self,
        game: &Game,
        player_id: &str,
        found_in: GamePartition,
    ) -> Result<GamePartition, GameIndexServiceError> {
        let expected = Self::expected_partition(game, player_id);
        if expected != found_in {
            warn!(
                "Repairing index for player {}: game {} was in {}, belongs in {}",
                player_id, game.id, found_in, expected
            );
            self.file(&game.id, player_id, expected).await?;
            self.unfile(&game.id, player_id, found_in).await?;
        }
        Ok(expected)
    }

    /// Deletes an entry whose game no longer exists.
    pub async fn remove_orphan(
        &self,
        player_id: &str,
        partition: GamePartition,
        game_id: &str,
    ) -> Result<(), GameIndexServiceError> {
        warn!(
            "Removing orphaned {} entry for player {}: game {} does not exist",
            partition, player_id, game_id
        );
        self.unfile(game_id, player_id, partition).await
    }

    async fn file(
        &self,
        game_id: &str,
        player_id: &str,
        partition: GamePartition,
    ) -> Result<(), GameIndexServiceError> {
        let entry = IndexEntry::new(game_id, player_id, partition);
        let record = TableRecord::from_value(player_id, game_id, &entry)?;
        self.store
            .upsert(
                Table::for_partition(partition),
                &record,
                WriteCondition::Unconditional,
            )
            .await?;
        Ok(())
    }

    async fn unfile(
        &self,
        game_id: &str,
        player_id: &str,
        partition: GamePartition,
    ) -> Result<(), GameIndexServiceError> {
        self.store
            .delete(
                Table::for_partition(partition),
                player_id,
                game_id,
                WriteCondition::Unconditional,
            )
            .await?;
        Ok(())
    }
}
