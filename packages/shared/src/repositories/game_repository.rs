use async_trait::async_trait;
use std::sync::Arc;

use crate::models::game::Game;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::table_store_errors::TableStoreError;
use crate::repositories::table_store::{Table, TableRecord, TableStore, WriteCondition};

#[cfg(test)]
use mockall::automock;

pub const GAME_ROW_KEY: &str = "game";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Stores a new game and returns it with its first version.
    async fn create_game(&self, game: &Game) -> Result<Game, GameRepositoryError>;

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError>;

    /// Stores `game` only if the stored version still equals `game.version`.
    async fn update_game(&self, game: &Game) -> Result<Game, GameRepositoryError>;

    /// Removes `game` only if the stored version still equals `game.version`.
    async fn delete_game(&self, game: &Game) -> Result<(), GameRepositoryError>;
}

pub struct TableGameRepository {
    store: Arc<dyn TableStore>,
}

impl TableGameRepository {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    async fn write(
        &self,
        game: &Game,
        condition: WriteCondition,
        on_conflict: GameRepositoryError,
    ) -> Result<Game, GameRepositoryError> {
        let mut record = TableRecord::from_value(&game.id, GAME_ROW_KEY, game)?;
        record.version = game.version;

        match self.store.upsert(Table::Games, &record, condition).await {
            Ok(version) => Ok(Game {
                version,
                ..game.clone()
            }),
            Err(TableStoreError::PreconditionFailed) => Err(on_conflict),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl GameRepository for TableGameRepository {
    async fn create_game(&self, game: &Game) -> Result<Game, GameRepositoryError> {
        self.write(
            game,
            WriteCondition::NotExists,
            GameRepositoryError::AlreadyExists,
        )
        .await
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError> {
        let Some(record) = self.store.get(Table::Games, game_id, GAME_ROW_KEY).await? else {
            return Ok(None);
        };
        let mut game: Game = record.to_value()?;
        game.version = record.version;
        Ok(Some(game))
    }

    async fn update_game(&self, game: &Game) -> Result<Game, GameRepositoryError> {
        self.write(
            game,
            WriteCondition::VersionMatches(game.version),
            GameRepositoryError::ConcurrentUpdate,
        )
        .await
    }

    async fn delete_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        match self
            .store
            .delete(
                Table::Games,
                &game.id,
                GAME_ROW_KEY,
                WriteCondition::VersionMatches(game.version),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(TableStoreError::PreconditionFailed) => Err(GameRepositoryError::ConcurrentUpdate),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::Player;
    use crate::repositories::memory_store::InMemoryTableStore;

    fn repository() -> TableGameRepository {
        TableGameRepository::new(Arc::new(InMemoryTableStore::new()))
    }

    fn game() -> Game {
        Game::new(
            "Friendly",
            Player::new("white_player", "Alice"),
            Player::new("black_player", "Bob"),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_game() {
        let repository = repository();
        let created = repository.create_game(&game()).await.unwrap();
        assert_eq!(created.version, 1);

        let loaded = repository.get_game(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_get_missing_game_is_none() {
        assert!(repository().get_game("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_twice_is_rejected() {
        let repository = repository();
        let game = game();
        repository.create_game(&game).await.unwrap();
        assert_eq!(
            repository.create_game(&game).await.unwrap_err(),
            GameRepositoryError::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_stale_update_is_a_concurrent_update() {
        let repository = repository();
        let created = repository.create_game(&game()).await.unwrap();

        let mut first = created.clone();
        first.name = "First writer".to_string();
        let saved = repository.update_game(&first).await.unwrap();
        assert_eq!(saved.version, 2);

        let mut second = created.clone();
        second.name = "Second writer".to_string();
        assert_eq!(
            repository.update_game(&second).await.unwrap_err(),
            GameRepositoryError::ConcurrentUpdate
        );

        let stored = repository.get_game(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "First writer");
    }

    #[tokio::test]
    async fn test_delete_game() {
        let repository = repository();
        let created = repository.create_game(&game()).await.unwrap();
        repository.delete_game(&created).await.unwrap();
        assert!(repository.get_game(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_delete_is_a_concurrent_update() {
        let repository = repository();
        let created = repository.create_game(&game()).await.unwrap();
        let mut moved = created.clone();
        moved.name = "After a move".to_string();
        repository.update_game(&moved).await.unwrap();

        assert_eq!(
            repository.delete_game(&created).await.unwrap_err(),
            GameRepositoryError::ConcurrentUpdate
        );
        let stored = repository.get_game(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "After a move");
    }
}
