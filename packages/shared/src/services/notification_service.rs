use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::repositories::websocket_repository::WebSocketRepository;

#[cfg(test)]
use mockall::automock;

/// Tells a player it is their turn. Callers treat failures as non-fatal.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        player_id: &str,
        game_id: &str,
        comment: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Pushes turn notifications to the player's open websocket connection.
#[derive(Clone)]
pub struct WebSocketNotifier {
    repository: Arc<dyn WebSocketRepository>,
}

impl WebSocketNotifier {
    pub fn new(repository: Arc<dyn WebSocketRepository>) -> Self {
        Self { repository }
    }

    pub fn message(game_id: &str, comment: &str) -> String {
        json!({
            "type": "your_turn",
            "game_id": game_id,
            "comment": comment,
        })
        .to_string()
    }
}

#[async_trait]
impl Notifier for WebSocketNotifier {
    async fn notify(
        &self,
        player_id: &str,
        game_id: &str,
        comment: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self.repository.get_connection_id(player_id).await? {
            Some(connection_id) => {
                info!("Notifying player {} about game {}", player_id, game_id);
                self.repository
                    .send_message(&connection_id, &Self::message(game_id, comment))
                    .await
            }
            None => {
                info!(
                    "Player {} is not connected, skipping notification",
                    player_id
                );
                Ok(())
            }
        }
    }
}

/// Records notifications in the log only. Used when no websocket endpoint is
/// configured.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(
        &self,
        player_id: &str,
        game_id: &str,
        comment: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Turn notification for player {} in game {}: {}",
            player_id, game_id, comment
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeWebSocketRepository {
        connection: Option<String>,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl WebSocketRepository for FakeWebSocketRepository {
        async fn get_connection_id(
            &self,
            _player_id: &str,
        ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.connection.clone())
        }

        async fn send_message(
            &self,
            connection_id: &str,
            message: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.sent
                .lock()
                .unwrap()
                .push((connection_id.to_string(), message.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_notify_sends_to_open_connection() {
        let repository = Arc::new(FakeWebSocketRepository {
            connection: Some("conn-1".to_string()),
            ..Default::default()
        });
        let notifier = WebSocketNotifier::new(repository.clone());

        notifier.notify("black_player", "game-1", "your move").await.unwrap();

        let sent = repository.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "conn-1");
        let body: serde_json::Value = serde_json::from_str(&sent[0].1).unwrap();
        assert_eq!(body["type"], "your_turn");
        assert_eq!(body["game_id"], "game-1");
        assert_eq!(body["comment"], "your move");
    }

    #[tokio::test]
    async fn test_notify_skips_disconnected_player() {
        let repository = Arc::new(FakeWebSocketRepository::default());
        let notifier = WebSocketNotifier::new(repository.clone());

        notifier.notify("black_player", "game-1", "").await.unwrap();

        assert!(repository.sent.lock().unwrap().is_empty());
    }
}
