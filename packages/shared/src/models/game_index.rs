use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-player index partitions. Each player of a game is filed in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePartition {
    WaitingForYou,
    WaitingForOpponent,
    Archive,
}

impl GamePartition {
    pub const ALL: [GamePartition; 3] = [
        GamePartition::WaitingForYou,
        GamePartition::WaitingForOpponent,
        GamePartition::Archive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePartition::WaitingForYou => "WaitingForYou",
            GamePartition::WaitingForOpponent => "WaitingForOpponent",
            GamePartition::Archive => "Archive",
        }
    }
}

impl fmt::Display for GamePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GamePartition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "waitingforyou" => Ok(GamePartition::WaitingForYou),
            "waitingforopponent" => Ok(GamePartition::WaitingForOpponent),
            "archive" => Ok(GamePartition::Archive),
            _ => Err(format!("unknown game partition '{}'", s)),
        }
    }
}

/// Which of a player's games to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameListFilter {
    /// Both waiting partitions.
    Active,
    Partition(GamePartition),
}

impl GameListFilter {
    pub fn partitions(&self) -> Vec<GamePartition> {
        match self {
            GameListFilter::Active => vec![
                GamePartition::WaitingForYou,
                GamePartition::WaitingForOpponent,
            ],
            GameListFilter::Partition(partition) => vec![*partition],
        }
    }
}

impl Default for GameListFilter {
    fn default() -> Self {
        GameListFilter::Active
    }
}

impl FromStr for GameListFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("active") {
            return Ok(GameListFilter::Active);
        }
        s.parse().map(GameListFilter::Partition)
    }
}

/// Pointer record filing one player's view of a game in a partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub game_id: String,
    pub player_id: String,
    pub partition: GamePartition,
    pub filed_at: DateTime<Utc>,
}

impl IndexEntry {
    pub fn new(game_id: &str, player_id: &str, partition: GamePartition) -> Self {
        IndexEntry {
            game_id: game_id.to_string(),
            player_id: player_id.to_string(),
            partition,
            filed_at: Utc::now(),
        }
    }
}
