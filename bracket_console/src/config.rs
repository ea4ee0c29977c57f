//! Console configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use bracket_engine::{GuildId, RegistryConfig};
use std::path::PathBuf;

/// Snapshot file used when nothing else is configured
pub const DEFAULT_SNAPSHOT_PATH: &str = "bracket_snapshot.json";

/// Complete console configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Guild the console acts in
    pub guild_id: GuildId,
    /// Snapshot file; `None` keeps everything in memory
    pub snapshot_path: Option<PathBuf>,
    /// Actor and reward settings
    pub registry: RegistryConfig,
}

impl ConsoleConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `guild_override` - Optional guild id (from CLI args)
    /// * `snapshot_override` - Optional snapshot path (from CLI args)
    /// * `in_memory` - Skip the snapshot file entirely
    ///
    /// # Returns
    ///
    /// * `Result<ConsoleConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if `BRACKET_GUILD_ID` is set but not a number
    pub fn from_env(
        guild_override: Option<GuildId>,
        snapshot_override: Option<PathBuf>,
        in_memory: bool,
    ) -> Result<Self, ConfigError> {
        let guild_id = match guild_override {
            Some(guild_id) => guild_id,
            None => match std::env::var("BRACKET_GUILD_ID") {
                Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "BRACKET_GUILD_ID".to_string(),
                    reason: format!("'{value}' is not a guild id"),
                })?,
                Err(_) => 1,
            },
        };

        let snapshot_path = match (in_memory, snapshot_override) {
            (true, _) => None,
            (false, Some(path)) => Some(path),
            (false, None) => Some(match std::env::var("BRACKET_SNAPSHOT_PATH") {
                Ok(path) => PathBuf::from(path),
                Err(_) => PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            }),
        };

        Ok(Self {
            guild_id,
            snapshot_path,
            registry: RegistryConfig::from_env(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guild_id == 0 {
            return Err(ConfigError::Invalid {
                var: "BRACKET_GUILD_ID".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        if let Some(path) = &self.snapshot_path
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid {
                var: "BRACKET_SNAPSHOT_PATH".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        self.registry
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "BRACKET_*".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
