//! Registry configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::tournament::RewardTable;

/// Settings shared by every guild's tournament actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Seconds before an unanswered team invite is dropped (default: 300)
    pub invite_ttl_secs: u64,

    /// Bounded inbox size per actor (default: 100)
    pub inbox_capacity: usize,

    /// Points per placement
    pub rewards: RewardTable,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            invite_ttl_secs: 300,
            inbox_capacity: 100,
            rewards: RewardTable::default(),
        }
    }
}

impl RegistryConfig {
    /// Load from `BRACKET_INVITE_TTL_SECS`, `BRACKET_INBOX_CAPACITY` and
    /// `BRACKET_REWARDS`, falling back to defaults for missing or unparsable values
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            invite_ttl_secs: parse_env_or("BRACKET_INVITE_TTL_SECS", defaults.invite_ttl_secs),
            inbox_capacity: parse_env_or("BRACKET_INBOX_CAPACITY", defaults.inbox_capacity),
            rewards: parse_env_or("BRACKET_REWARDS", defaults.rewards),
        }
    }

    pub fn invite_ttl(&self) -> Duration {
        Duration::from_secs(self.invite_ttl_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.invite_ttl_secs == 0 {
            return Err("Invite TTL must be at least one second".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be greater than zero".to_string());
        }

        if self.rewards.rewards.is_empty() {
            return Err("Reward table must have at least one entry".to_string());
        }

        Ok(())
    }
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
