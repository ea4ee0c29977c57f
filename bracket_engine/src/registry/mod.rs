//! Per-guild tournament actors.
//!
//! Each guild's [`Tournament`](crate::tournament::Tournament) is owned by a
//! [`TournamentActor`] running on tokio. Callers talk to it through a cloneable
//! [`TournamentHandle`]; the [`TournamentRegistry`] creates actors on demand,
//! credits points when a tournament completes and writes checkpoints through a
//! [`SnapshotStore`].

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;
pub mod store;

pub use actor::{TournamentActor, TournamentHandle};
pub use config::RegistryConfig;
pub use errors::{RegistryError, RegistryResult};
pub use manager::TournamentRegistry;
pub use messages::TournamentMessage;
pub use store::{
    JsonFileStore, MemoryStore, RegistrySnapshot, SnapshotStore, StoreError, StoreResult,
};
