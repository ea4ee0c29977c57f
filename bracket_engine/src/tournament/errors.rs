//! Bracket error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::EntrantId;

/// Errors returned by bracket operations
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BracketError {
    /// Mode/capacity combination can't form a bracket
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No tournament has been configured")]
    NotConfigured,

    #[error("Tournament has already started")]
    AlreadyStarted,

    #[error("No tournament is active")]
    NotActive,

    /// Team operation on a 1v1 tournament
    #[error("Team operations require a 2v2 tournament")]
    WrongMode,

    #[error("Entrant {0} is already registered")]
    DuplicateEntrant(EntrantId),

    #[error("Entrant {0} is not registered")]
    NotRegistered(EntrantId),

    /// 2v2 registration without a confirmed team
    #[error("Entrant {0} has no team")]
    NoTeam(EntrantId),

    #[error("Entrant {0} is already in a team")]
    AlreadyTeamed(EntrantId),

    #[error("Entrants cannot invite themselves")]
    SelfInvite,

    #[error("Synthetic fillers cannot be invited")]
    SyntheticInvitee,

    /// Invitee already holds an unanswered invite
    #[error("Entrant {0} already has a pending invite")]
    InvitePending(EntrantId),

    #[error("No pending invite for entrant {0}")]
    NoPendingInvite(EntrantId),

    #[error("Tournament is full: {capacity} slots taken")]
    Full { capacity: usize },

    #[error("Not enough competitors: need {needed}, have {current}")]
    NotEnoughEntrants { needed: usize, current: usize },

    /// Round 1 must be a power of two so every later round pairs evenly
    #[error("Field of {current} competitors can't be bracketed: fill up to {needed}")]
    UnbalancedField { current: usize, needed: usize },

    /// No undecided bout of the current round contains the entrant
    #[error("Entrant {0} has no undecided bout in the current round")]
    NotInCurrentRound(EntrantId),

    #[error("Cannot add {requested} fillers: only {remaining} slots remain")]
    InsufficientCapacityForFill { requested: usize, remaining: usize },

    /// Bracket invariant violated; never expected in a correct engine
    #[error("Internal bracket state error: {0}")]
    InternalState(String),
}

impl BracketError {
    /// Lifecycle errors: the operation isn't valid in the current state
    pub fn is_wrong_state(&self) -> bool {
        matches!(
            self,
            BracketError::NotConfigured | BracketError::AlreadyStarted | BracketError::NotActive
        )
    }

    /// Get a message suitable for showing to the chat member who caused it.
    ///
    /// Member ids are left out and internal state errors are sanitized.
    pub fn client_message(&self) -> String {
        match self {
            BracketError::InvalidConfiguration(reason) => format!("❌ Invalid format: {reason}"),
            BracketError::NotConfigured => "❌ No tournament has been created yet.".to_string(),
            BracketError::AlreadyStarted => "❌ The tournament has already started.".to_string(),
            BracketError::NotActive => "❌ There is no active tournament.".to_string(),
            BracketError::WrongMode => "❌ Teams are only used in 2v2 tournaments.".to_string(),
            BracketError::DuplicateEntrant(_) => "❌ You are already registered.".to_string(),
            BracketError::NotRegistered(_) => "❌ You are not registered.".to_string(),
            BracketError::NoTeam(_) => {
                "❌ You need a teammate before registering for 2v2.".to_string()
            }
            BracketError::AlreadyTeamed(_) => "❌ That player is already in a team.".to_string(),
            BracketError::SelfInvite => "❌ You can't invite yourself.".to_string(),
            BracketError::SyntheticInvitee => "❌ You can't invite a bot.".to_string(),
            BracketError::InvitePending(_) => {
                "❌ That player already has a pending invite.".to_string()
            }
            BracketError::NoPendingInvite(_) => "❌ You don't have a pending invite.".to_string(),
            BracketError::Full { .. } => "❌ The tournament is full.".to_string(),
            BracketError::NotEnoughEntrants { needed, current } => {
                format!("❌ Not enough players to start ({current}/{needed}).")
            }
            BracketError::UnbalancedField { current, needed } => {
                format!("❌ The bracket needs {needed} players or teams, there are {current}.")
            }
            BracketError::NotInCurrentRound(_) => {
                "❌ That player has no open match in this round.".to_string()
            }
            BracketError::InsufficientCapacityForFill { remaining, .. } => {
                format!("❌ Only {remaining} slots left.")
            }
            BracketError::InternalState(_) => {
                "❌ Something went wrong with the bracket.".to_string()
            }
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
