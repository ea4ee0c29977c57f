//! Single-elimination brackets for 1v1 and 2v2 play.
//!
//! This module provides the bracket engine including:
//! - Tournament configuration and registration
//! - The two-phase team invite protocol for 2v2
//! - Synthetic fillers for short rosters
//! - Seeded round-1 pairing and winner-order advancement
//! - Placements and rewards from the elimination history
//!
//! ## Example
//!
//! ```
//! use bracket_engine::tournament::{
//!     Entrant, EntrantId, Mode, RoundProgress, Seeder, Tournament, TournamentMetadata,
//! };
//!
//! let mut tournament = Tournament::new();
//! tournament
//!     .configure(Mode::Solo, 2, TournamentMetadata::titled("Friday Cup"))
//!     .unwrap();
//! tournament.register(Entrant::member(1, "alice")).unwrap();
//! tournament.register(Entrant::member(2, "bob")).unwrap();
//! tournament.start(&mut Seeder::new()).unwrap();
//!
//! let outcome = tournament.record_winner(EntrantId::Member(1)).unwrap();
//! assert!(matches!(outcome.progress, RoundProgress::Complete(_)));
//! ```

pub mod engine;
pub mod errors;
pub mod models;
pub mod placement;
pub mod seeding;
pub mod teams;

pub use engine::{
    CompletionReport, MIN_COMPETITORS, Registration, RoundProgress, StartSummary, TeamDeparture,
    Tournament, WinnerOutcome, Withdrawal,
};
pub use errors::{BracketError, BracketResult};
pub use models::{
    ALLOWED_CAPACITIES, Bout, Capacity, Competitor, Entrant, EntrantId, Format, GuildId, Mode,
    Placement, RealEntrant, RewardTable, Round, Side, SyntheticEntrant, Team, TournamentMetadata,
    TournamentState,
};
pub use placement::{RANKED_PLACES, compute_placements};
pub use seeding::Seeder;
pub use teams::{InviteId, PendingInvite, TeamBook};
