//! Bot configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration. Missing credentials are fatal before any core operation
//! starts.

use std::path::PathBuf;

use tournament_sync::OwnerId;

/// Which matching policy the synchronizer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMode {
    /// Skip records whose name matches a listed feed event.
    EventName,
    /// Skip records present in the durable dedup ledger.
    Ledger,
}

/// Complete bot configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// start.gg API credential
    pub startgg_api_key: String,
    /// Discord bot token
    pub discord_token: String,
    /// Discord guild whose scheduled events are synced
    pub guild_id: u64,
    /// Optional default state selector, e.g. "NC"
    pub state: Option<String>,
    /// Optional default game filter; empty means no game filter
    pub game_slugs: Vec<String>,
    /// Optional default owner selector; empty means no owner filter
    pub owner_ids: Vec<OwnerId>,
    /// How many days ahead of now the query window extends
    pub window_days: i64,
    /// Dedup policy for the synchronizer
    pub dedup: DedupMode,
    /// Ledger file used by the ledger policy
    pub ledger_path: PathBuf,
    /// Optional JSON export destination written after filtering
    pub export_path: Option<PathBuf>,
    /// Minutes between sync cycles
    pub interval_mins: u64,
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl BotConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let startgg_api_key =
            require("STARTGG_API_KEY", "See developer.start.gg/docs/authentication")?;
        let discord_token = require("BOT_TOKEN", "Bot token from the Discord developer portal")?;
        let guild_id = require("GUILD_ID", "Numeric id of the target guild")?
            .parse()
            .map_err(|_| ConfigError::Invalid {
                var: "GUILD_ID".to_string(),
                reason: "Must be a numeric guild id".to_string(),
            })?;

        let state = std::env::var("STATE").ok().filter(|s| !s.is_empty());
        let game_slugs = split_list(&std::env::var("GAME_SLUGS").unwrap_or_default());
        let owner_ids = split_list(&std::env::var("OWNER_IDS").unwrap_or_default())
            .iter()
            .map(|raw| {
                raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "OWNER_IDS".to_string(),
                    reason: format!("'{raw}' is not a numeric owner id"),
                })
            })
            .collect::<Result<Vec<OwnerId>, _>>()?;

        let dedup = match std::env::var("DEDUP_POLICY").as_deref() {
            Err(_) | Ok("name") => DedupMode::EventName,
            Ok("ledger") => DedupMode::Ledger,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    var: "DEDUP_POLICY".to_string(),
                    reason: format!("'{other}' is not one of: name, ledger"),
                });
            }
        };

        Ok(BotConfig {
            startgg_api_key,
            discord_token,
            guild_id,
            state,
            game_slugs,
            owner_ids,
            window_days: parse_env_or("WINDOW_DAYS", 30),
            dedup,
            ledger_path: std::env::var("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("published_tournaments.json")),
            export_path: std::env::var("EXPORT_PATH").ok().map(PathBuf::from),
            interval_mins: parse_env_or("SYNC_INTERVAL_MINS", 60),
        })
    }

    /// Validate configuration after loading and after CLI overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state.is_none() && self.owner_ids.is_empty() {
            return Err(ConfigError::Invalid {
                var: "STATE".to_string(),
                reason: "Set STATE or OWNER_IDS to choose a selection mode".to_string(),
            });
        }

        if self.window_days < 1 {
            return Err(ConfigError::Invalid {
                var: "WINDOW_DAYS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.interval_mins < 1 {
            return Err(ConfigError::Invalid {
                var: "SYNC_INTERVAL_MINS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.guild_id == 0 {
            return Err(ConfigError::Invalid {
                var: "GUILD_ID".to_string(),
                reason: "Must be a non-zero guild id".to_string(),
            });
        }

        Ok(())
    }
}

fn require(var: &str, hint: &str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingRequired {
            var: var.to_string(),
            hint: hint.to_string(),
        })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BotConfig {
        BotConfig {
            startgg_api_key: "key".to_string(),
            discord_token: "token".to_string(),
            guild_id: 42,
            state: Some("NC".to_string()),
            game_slugs: vec![],
            owner_ids: vec![],
            window_days: 30,
            dedup: DedupMode::EventName,
            ledger_path: PathBuf::from("published_tournaments.json"),
            export_path: None,
            interval_mins: 60,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "STARTGG_API_KEY".to_string(),
            hint: "See the docs".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("STARTGG_API_KEY"));
        assert!(msg.contains("See the docs"));
    }

    #[test]
    fn test_validation_requires_a_selection_mode() {
        let mut config = config();
        config.state = None;
        config.owner_ids = vec![];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        config.owner_ids = vec![100];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let mut config = config();
        config.window_days = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let mut config = config();
        config.interval_mins = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list_trims_and_drops_empties() {
        assert_eq!(
            split_list("game/tekken-7, game/street-fighter-6,,"),
            vec!["game/tekken-7", "game/street-fighter-6"]
        );
        assert!(split_list("").is_empty());
    }
}
