//! The per-player index against interrupted writes. Duplicates and orphans are
//! healed on read, and every committed move leaves exactly one entry per
//! player in the partition the game's state implies.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use chess_games_tests::*;
use rstest::rstest;
use shared::models::game::{Game, Player};
use shared::models::game_index::{GameListFilter, GamePartition};
use shared::repositories::errors::game_repository_errors::GameRepositoryError;
use shared::repositories::game_repository::{GameRepository, TableGameRepository};
use shared::repositories::player_directory::StaticPlayerDirectory;
use shared::services::chess_service::ChessService;
use shared::services::errors::game_service_errors::GameServiceError;
use shared::services::game_index_service::GameIndexService;
use shared::services::game_service::GameService;
use shared::services::notification_service::TracingNotifier;

/// Serves one read from an earlier snapshot, as a request that loaded the
/// game just before another request committed a move would see it.
struct SnapshotRead {
    inner: TableGameRepository,
    snapshot: Mutex<Option<Game>>,
}

#[async_trait]
impl GameRepository for SnapshotRead {
    async fn create_game(&self, game: &Game) -> Result<Game, GameRepositoryError> {
        self.inner.create_game(game).await
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError> {
        let snapshot = self.snapshot.lock().ok().and_then(|mut s| s.take());
        match snapshot {
            Some(game) if game.id == game_id => Ok(Some(game)),
            _ => self.inner.get_game(game_id).await,
        }
    }

    async fn update_game(&self, game: &Game) -> Result<Game, GameRepositoryError> {
        self.inner.update_game(game).await
    }

    async fn delete_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        self.inner.delete_game(game).await
    }
}

async fn assert_filed_correctly(ctx: &TestContext, game: &Game) {
    for player in [WHITE, BLACK] {
        assert_eq!(
            ctx.partitions_of(player, &game.id).await,
            vec![GameIndexService::expected_partition(game, player)],
            "player {} after {} moves",
            player,
            game.moves.len()
        );
    }
}

#[tokio::test]
async fn test_every_move_keeps_one_entry_per_player() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let game = ctx.new_game().await?;
    assert_filed_correctly(&ctx, &game).await;

    let line = [
        "e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "O-O", "f8c5", "d2d3", "O-O",
    ];
    for notation in line {
        let game = ctx.play(&game.id, &[notation]).await?;
        assert_filed_correctly(&ctx, &game).await;
    }
    Ok(())
}

#[rstest]
#[case::mover_left_in_waiting_for_you(&["e2e4"], WHITE, GamePartition::WaitingForYou)]
#[case::receiver_left_in_waiting_for_opponent(&["e2e4"], BLACK, GamePartition::WaitingForOpponent)]
#[case::black_mover(&["e2e4", "e7e5"], BLACK, GamePartition::WaitingForYou)]
#[tokio::test]
async fn test_interrupted_refile_duplicate_is_repaired_on_list(
    #[case] moves: &[&str],
    #[case] player: &str,
    #[case] stale: GamePartition,
) -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let game = ctx.new_game().await?;
    let game = ctx.play(&game.id, moves).await?;
    let expected = GameIndexService::expected_partition(&game, player);

    ctx.plant_entry(player, &game.id, stale).await?;
    assert_eq!(ctx.partitions_of(player, &game.id).await.len(), 2);

    let listed = ctx.service.list_games(player, GameListFilter::Active).await?;
    assert_eq!(listed.iter().filter(|g| g.id == game.id).count(), 1);
    assert_eq!(ctx.partitions_of(player, &game.id).await, vec![expected]);

    // Nothing left to heal on the next read.
    let listed = ctx.service.list_games(player, GameListFilter::Active).await?;
    assert_eq!(listed.len(), 1);
    assert_filed_correctly(&ctx, &game).await;
    Ok(())
}

#[tokio::test]
async fn test_wrong_partition_lookup_repairs_but_misses() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let game = ctx.new_game().await?;
    let game = ctx.play(&game.id, &["e2e4"]).await?;

    // Only the stale entry survives for black.
    ctx.plant_entry(BLACK, &game.id, GamePartition::WaitingForOpponent)
        .await?;

    assert!(ctx
        .service
        .get_game(BLACK, &game.id, Some(GamePartition::WaitingForOpponent))
        .await
        .is_err());
    assert_filed_correctly(&ctx, &game).await;
    Ok(())
}

#[tokio::test]
async fn test_finished_game_left_in_waiting_is_archived_on_read() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let game = ctx.new_game().await?;
    let game = ctx.play(&game.id, &FOOLS_MATE).await?;

    // Waiting entries that survived the archive.
    ctx.plant_entry(WHITE, &game.id, GamePartition::WaitingForYou)
        .await?;
    ctx.plant_entry(BLACK, &game.id, GamePartition::WaitingForOpponent)
        .await?;

    for player in [WHITE, BLACK] {
        assert!(ctx
            .service
            .list_games(player, GameListFilter::Active)
            .await?
            .is_empty());
    }
    assert_filed_correctly(&ctx, &game).await;
    assert_eq!(
        ctx.service
            .list_games(WHITE, GameListFilter::Partition(GamePartition::Archive))
            .await?
            .len(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn test_orphan_from_interrupted_create_is_removed() -> anyhow::Result<()> {
    let ctx = TestContext::new();

    // The index was written but the game record never was.
    let orphan = Game::new(
        "Never saved",
        Player::new(WHITE, "Alice Example"),
        Player::new(BLACK, "Bob Example"),
    );
    ctx.index().file_new_game(&orphan).await?;
    let real = ctx.new_game().await?;

    let listed = ctx.service.list_games(WHITE, GameListFilter::Active).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, real.id);
    assert!(ctx.partitions_of(WHITE, &orphan.id).await.is_empty());

    // Black's entry is only cleaned when black reads.
    assert_eq!(ctx.partitions_of(BLACK, &orphan.id).await.len(), 1);
    ctx.service.list_games(BLACK, GameListFilter::Active).await?;
    assert!(ctx.partitions_of(BLACK, &orphan.id).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_retraction_racing_a_move_keeps_the_game() -> anyhow::Result<()> {
    let ctx = TestContext::new();
    let unplayed = ctx.new_game().await?;
    ctx.play(&unplayed.id, &["e2e4"]).await?;

    let racing = GameService::new(
        Arc::new(SnapshotRead {
            inner: TableGameRepository::new(ctx.store.clone()),
            snapshot: Mutex::new(Some(unplayed.clone())),
        }),
        GameIndexService::new(ctx.store.clone()),
        ChessService::default(),
        Arc::new(StaticPlayerDirectory::new(vec![
            Player::new(WHITE, "Alice Example"),
            Player::new(BLACK, "Bob Example"),
        ])),
        Arc::new(TracingNotifier),
    );

    let err = racing.delete_game(WHITE, &unplayed.id).await.unwrap_err();
    assert_eq!(err, GameServiceError::ConcurrentUpdate);

    let game = ctx.service.get_game(WHITE, &unplayed.id, None).await?;
    assert_eq!(game.moves.len(), 1);
    assert_filed_correctly(&ctx, &game).await;

    // With a fresh read the delete is a resignation.
    racing.delete_game(BLACK, &unplayed.id).await?;
    let game = ctx.service.get_game(WHITE, &unplayed.id, None).await?;
    assert!(game.is_finished());
    assert_filed_correctly(&ctx, &game).await;
    Ok(())
}
