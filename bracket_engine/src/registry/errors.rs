//! Registry error types.

use thiserror::Error;

use super::store::StoreError;
use crate::tournament::{BracketError, GuildId};

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The engine rejected the operation
    #[error(transparent)]
    Bracket(#[from] BracketError),

    /// The guild's actor stopped before answering
    #[error("Tournament actor for guild {0} is not running")]
    ActorUnavailable(GuildId),

    #[error("Snapshot store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            RegistryError::Bracket(err) => err.client_message(),
            RegistryError::ActorUnavailable(_) | RegistryError::Store(_) => {
                "❌ The tournament service is unavailable right now.".to_string()
            }
        }
    }

    /// The engine error behind this failure, if any
    pub fn as_bracket(&self) -> Option<&BracketError> {
        match self {
            RegistryError::Bracket(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
