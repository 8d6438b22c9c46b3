//! Shared fixtures for the game tests: a game service wired to the in-memory
//! store, a notifier that records what it was asked to send, and helpers for
//! playing move sequences.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use api::state::AppState;
use shared::config::PromotionPolicy;
use shared::models::game::{Game, Player, SpecialMove};
use shared::models::game_index::{GamePartition, IndexEntry};
use shared::repositories::game_repository::TableGameRepository;
use shared::repositories::memory_store::InMemoryTableStore;
use shared::repositories::player_directory::StaticPlayerDirectory;
use shared::repositories::table_store::{Table, TableRecord, TableStore, WriteCondition};
use shared::services::chess_service::ChessService;
use shared::services::game_index_service::GameIndexService;
use shared::services::game_service::GameService;
use shared::services::notification_service::Notifier;
use shared::services::token_service::TokenService;

pub const WHITE: &str = "alice";
pub const BLACK: &str = "bob";
pub const OUTSIDER: &str = "mallory";

pub const JWT_SECRET: &str = "integration-test-secret";

pub const FOOLS_MATE: [&str; 4] = ["f2f3", "e7e5", "g2g4", "d8h4"];

/// Leaves white to move with a pawn on g7 that promotes by taking on h8.
pub const PROMOTION_LINE: [&str; 8] = [
    "h2h4", "g7g5", "h4g5", "h7h6", "g5h6", "f8g7", "h6g7", "b8c6",
];

/// Loyd's ten-move stalemate: white's last move leaves black without a
/// legal move and not in check.
pub const STALEMATE_LINE: [&str; 19] = [
    "e2e3", "a7a5", "d1h5", "a8a6", "h5a5", "h7h5", "h2h4", "a6h6", "a5c7", "f7f6",
    "c7d7", "e8f7", "d7b7", "d8d3", "b7b8", "d3h7", "b8c8", "f7g6", "c8e6",
];

/// Trades down until only the kings remain; the last move captures the final
/// rook.
pub const BARE_KINGS_LINE: [&str; 55] = [
    "d2d4", "e7e5", "d4e5", "d8f6", "d1d7", "b8d7", "e5f6", "g8f6", "c1g5", "g7g6",
    "g5f6", "d7f6", "h2h3", "c8h3", "g1h3", "e8d7", "h1g1", "f6g4", "b1a3", "g4f2",
    "e1f2", "f8a3", "b2a3", "d7e6", "a1b1", "c7c5", "b1b7", "h7h5", "b7a7", "a8a7",
    "h3f4", "e6e7", "f4h5", "a7a3", "g1h1", "a3a2", "h1g1", "g6h5", "g2g4", "h5g4",
    "g1g4", "a2c2", "g4g8", "c2e2", "f2e2", "h8g8", "e2e1", "c5c4", "f1c4", "g8g5",
    "c4f7", "e7f7", "e1f1", "g5g2", "f1g2",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub player_id: String,
    pub game_id: String,
    pub comment: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        player_id: &str,
        game_id: &str,
        comment: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sent
            .lock()
            .map_err(|_| "notifier lock poisoned")?
            .push(Notification {
                player_id: player_id.to_string(),
                game_id: game_id.to_string(),
                comment: comment.to_string(),
            });
        Ok(())
    }
}

pub struct TestContext {
    pub store: Arc<InMemoryTableStore>,
    pub service: Arc<GameService>,
    pub notifier: Arc<RecordingNotifier>,
    pub tokens: TokenService,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(PromotionPolicy::DefaultToQueen)
    }

    pub fn with_policy(policy: PromotionPolicy) -> Self {
        init_tracing();
        let store = Arc::new(InMemoryTableStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let players = StaticPlayerDirectory::new(vec![
            Player::new(WHITE, "Alice Example"),
            Player::new(BLACK, "Bob Example"),
            Player::new(OUTSIDER, "Mallory Example"),
        ]);

        let service = GameService::new(
            Arc::new(TableGameRepository::new(store.clone())),
            GameIndexService::new(store.clone()),
            ChessService::new(policy),
            Arc::new(players),
            notifier.clone(),
        );

        TestContext {
            store,
            service: Arc::new(service),
            notifier,
            tokens: TokenService::new(JWT_SECRET),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            game_service: self.service.clone(),
            token_service: Arc::new(self.tokens.clone()),
        }
    }

    pub fn token(&self, player_id: &str) -> String {
        self.tokens
            .issue_token(player_id, chrono::Duration::hours(1))
            .unwrap_or_default()
    }

    pub fn index(&self) -> GameIndexService {
        GameIndexService::new(self.store.clone())
    }

    pub async fn new_game(&self) -> anyhow::Result<Game> {
        Ok(self.service.create_game(WHITE, BLACK, "Test game").await?)
    }

    /// Plays `moves` in order, each by whichever side is to move.
    pub async fn play(&self, game_id: &str, moves: &[&str]) -> anyhow::Result<Game> {
        let mut game = self.service.get_game(WHITE, game_id, None).await?;
        for notation in moves {
            let mover = game.player(game.side_to_move()).id.clone();
            game = self
                .service
                .add_move(&mover, game_id, notation, SpecialMove::None, "")
                .await?;
        }
        Ok(game)
    }

    /// Writes an index entry behind the service's back, the way an
    /// interrupted refile or create would leave one.
    pub async fn plant_entry(
        &self,
        player_id: &str,
        game_id: &str,
        partition: GamePartition,
    ) -> anyhow::Result<()> {
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

    /// Every partition holding an entry for `player_id` and `game_id`.
    pub async fn partitions_of(&self, player_id: &str, game_id: &str) -> Vec<GamePartition> {
        let mut found = Vec::new();
        for partition in GamePartition::ALL {
            let entry = self
                .store
                .get(Table::for_partition(partition), player_id, game_id)
                .await;
            if matches!(entry, Ok(Some(_))) {
                found.push(partition);
            }
        }
        found
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
