use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use serde::Deserialize;
use serde_dynamo::{from_item, to_attribute_value};
use std::collections::HashMap;

use crate::models::game::Player;
use crate::repositories::errors::player_directory_errors::PlayerDirectoryError;

#[cfg(test)]
use mockall::automock;

/// Read-only view of the user directory, used to resolve opponents.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn find_player(&self, player_id: &str) -> Result<Option<Player>, PlayerDirectoryError>;
}

#[derive(Debug, Deserialize)]
struct UserItem {
    id: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

impl UserItem {
    fn into_player(self) -> Player {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string();
        if name.is_empty() {
            Player::new(&self.id, &self.id)
        } else {
            Player::new(&self.id, &name)
        }
    }
}

pub struct DynamoDbPlayerDirectory {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbPlayerDirectory {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl PlayerDirectory for DynamoDbPlayerDirectory {
    async fn find_player(&self, player_id: &str) -> Result<Option<Player>, PlayerDirectoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(player_id)
                    .map_err(|e| PlayerDirectoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| PlayerDirectoryError::DynamoDb(e.to_string()))?;

        match output.item {
            Some(item) => {
                let user: UserItem = from_item(item)
                    .map_err(|e| PlayerDirectoryError::Serialization(e.to_string()))?;
                Ok(Some(user.into_player()))
            }
            None => Ok(None),
        }
    }
}

/// Fixed set of players, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPlayerDirectory {
    players: HashMap<String, Player>,
}

impl StaticPlayerDirectory {
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}

#[async_trait]
impl PlayerDirectory for StaticPlayerDirectory {
    async fn find_player(&self, player_id: &str) -> Result<Option<Player>, PlayerDirectoryError> {
        Ok(self.players.get(player_id).cloned())
    }
}
