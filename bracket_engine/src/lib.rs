//! # Bracket Engine
//!
//! Single-elimination tournaments for chat-platform bots.
//!
//! A guild runs at most one tournament at a time. Members register in 1v1
//! mode, or form a team through an invite and register together in 2v2 mode.
//! Short rosters are topped up with synthetic fillers. Starting the tournament
//! shuffles the field into round 1; recorded winners advance in the order their
//! results came in, and the elimination history decides the final placements.
//!
//! ## Core Modules
//!
//! - [`tournament`]: The bracket aggregate, its models and errors
//! - [`display`]: Pure text rendering for rounds, rosters and results
//! - [`points`]: Tournament points balances and rank tiers
//! - [`registry`]: One tokio actor per guild, with checkpointing
//!
//! ## Example
//!
//! ```
//! use bracket_engine::{
//!     display::{self, PlainNames},
//!     tournament::{Entrant, Mode, Seeder, Tournament, TournamentMetadata},
//! };
//!
//! let mut tournament = Tournament::new();
//! tournament
//!     .configure(Mode::Solo, 4, TournamentMetadata::titled("Friday Cup"))
//!     .unwrap();
//! tournament.register(Entrant::member(1, "alice")).unwrap();
//! tournament.fill_with_synthetic(tournament.remaining_capacity()).unwrap();
//!
//! let summary = tournament.start(&mut Seeder::from_seed(7)).unwrap();
//! let card = display::round_card(
//!     tournament.metadata(),
//!     Mode::Solo,
//!     &summary.round,
//!     &PlainNames,
//! );
//! assert!(card.starts_with("🏆 Friday Cup - Round 1"));
//! ```

/// Text rendering for brackets.
pub mod display;

/// Tournament points and rank tiers.
pub mod points;
pub use points::{PointsLedger, Rank};

/// Per-guild actors, registry and snapshots.
pub mod registry;
pub use registry::{RegistryConfig, RegistryError, TournamentHandle, TournamentRegistry};

/// Bracket engine: models, errors and the tournament aggregate.
pub mod tournament;
pub use tournament::{BracketError, BracketResult, Entrant, EntrantId, GuildId, Mode, Tournament};
