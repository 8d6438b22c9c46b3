use std::fmt;
use std::str::FromStr;

/// What to do with a promotion move that names no piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionPolicy {
    #[default]
    DefaultToQueen,
    Strict,
}

impl FromStr for PromotionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "queen" | "default" => Ok(PromotionPolicy::DefaultToQueen),
            "strict" => Ok(PromotionPolicy::Strict),
            _ => Err(format!("unknown promotion policy '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub games: String,
    pub waiting_for_you: String,
    pub waiting_for_opponent: String,
    pub archive: String,
    pub users: String,
    pub player_connections: String,
}

impl Default for TableNames {
    fn default() -> Self {
        TableNames {
            games: "Games".to_string(),
            waiting_for_you: "WaitingForYou".to_string(),
            waiting_for_opponent: "WaitingForOpponent".to_string(),
            archive: "Archive".to_string(),
            users: "Users".to_string(),
            player_connections: "PlayerConnections".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tables: TableNames,
    pub promotion_policy: PromotionPolicy,
    pub index_write_attempts: u32,
    pub jwt_secret: String,
    pub websocket_endpoint: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(String),
    Invalid { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} environment variable must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "invalid value '{}' for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TableNames::default();
        let table = |key: &str, default: String| lookup(key).unwrap_or(default);

        let tables = TableNames {
            games: table("GAMES_TABLE", defaults.games),
            waiting_for_you: table("WAITING_FOR_YOU_TABLE", defaults.waiting_for_you),
            waiting_for_opponent: table(
                "WAITING_FOR_OPPONENT_TABLE",
                defaults.waiting_for_opponent,
            ),
            archive: table("ARCHIVE_TABLE", defaults.archive),
            users: table("USERS_TABLE", defaults.users),
            player_connections: table("PLAYER_CONNECTIONS_TABLE", defaults.player_connections),
        };

        let promotion_policy = match lookup("PROMOTION_POLICY") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "PROMOTION_POLICY".to_string(),
                value,
            })?,
            None => PromotionPolicy::default(),
        };

        let index_write_attempts = match lookup("INDEX_WRITE_ATTEMPTS") {
            Some(value) => match value.parse::<u32>() {
                Ok(attempts) if attempts > 0 => attempts,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "INDEX_WRITE_ATTEMPTS".to_string(),
                        value,
                    })
                }
            },
            None => 3,
        };

        let jwt_secret =
            lookup("JWT_SECRET").ok_or_else(|| ConfigError::Missing("JWT_SECRET".to_string()))?;

        Ok(AppConfig {
            tables,
            promotion_policy,
            index_write_attempts,
            jwt_secret,
            websocket_endpoint: lookup("WEBSOCKET_API_ENDPOINT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).unwrap();
        assert_eq!(config.tables, TableNames::default());
        assert_eq!(config.promotion_policy, PromotionPolicy::DefaultToQueen);
        assert_eq!(config.index_write_attempts, 3);
        assert!(config.websocket_endpoint.is_none());
    }

    #[test]
    fn test_overrides_are_read() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "secret"),
            ("GAMES_TABLE", "games-dev"),
            ("ARCHIVE_TABLE", "archive-dev"),
            ("PROMOTION_POLICY", "strict"),
            ("INDEX_WRITE_ATTEMPTS", "5"),
            ("WEBSOCKET_API_ENDPOINT", "https://ws.example.com/dev"),
        ]))
        .unwrap();
        assert_eq!(config.tables.games, "games-dev");
        assert_eq!(config.tables.archive, "archive-dev");
        assert_eq!(config.tables.waiting_for_you, "WaitingForYou");
        assert_eq!(config.promotion_policy, PromotionPolicy::Strict);
        assert_eq!(config.index_write_attempts, 5);
        assert_eq!(
            config.websocket_endpoint.as_deref(),
            Some("https://ws.example.com/dev")
        );
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET".to_string()));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "secret"),
            ("PROMOTION_POLICY", "bishop"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "secret"),
            ("INDEX_WRITE_ATTEMPTS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
