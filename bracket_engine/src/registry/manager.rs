//! Tournament registry owning one actor per guild.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use super::{
    actor::{TournamentActor, TournamentHandle},
    config::RegistryConfig,
    errors::RegistryResult,
    store::{RegistrySnapshot, SnapshotStore},
};
use crate::{
    points::{Award, PointsLedger, Rank},
    tournament::{EntrantId, GuildId, RoundProgress, Tournament, WinnerOutcome},
};

/// Registry for managing per-guild tournament actors
pub struct TournamentRegistry {
    /// Settings handed to every actor
    config: RegistryConfig,

    /// Checkpoint destination
    store: Arc<dyn SnapshotStore>,

    /// Active tournament handles
    tournaments: Arc<RwLock<HashMap<GuildId, TournamentHandle>>>,

    /// Points earned across tournaments
    points: Arc<RwLock<PointsLedger>>,
}

impl TournamentRegistry {
    /// Create a new tournament registry
    ///
    /// # Arguments
    ///
    /// * `config` - Actor settings
    /// * `store` - Where checkpoints are written
    ///
    /// # Returns
    ///
    /// * `TournamentRegistry` - Empty registry; call `load` to restore a checkpoint
    pub fn new(config: RegistryConfig, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            config,
            store,
            tournaments: Arc::new(RwLock::new(HashMap::new())),
            points: Arc::new(RwLock::new(PointsLedger::new())),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Handle for a guild's tournament, spawning an unconfigured one on first use
    pub async fn handle(&self, guild_id: GuildId) -> TournamentHandle {
        {
            let tournaments = self.tournaments.read().await;
            if let Some(handle) = tournaments.get(&guild_id).filter(|h| !h.is_closed()) {
                return handle.clone();
            }
        }

        let mut tournaments = self.tournaments.write().await;
        match tournaments.get(&guild_id) {
            Some(handle) if !handle.is_closed() => handle.clone(),
            _ => {
                let handle = self.spawn(guild_id, Tournament::new());
                tournaments.insert(guild_id, handle.clone());
                handle
            }
        }
    }

    fn spawn(&self, guild_id: GuildId, tournament: Tournament) -> TournamentHandle {
        let (actor, handle) = TournamentActor::new(guild_id, tournament, &self.config);
        tokio::spawn(actor.run());
        log::debug!("Spawned tournament actor for guild {}", guild_id);
        handle
    }

    /// Record a winner and credit points if that finished the tournament
    pub async fn record_winner(
        &self,
        guild_id: GuildId,
        entrant: EntrantId,
    ) -> RegistryResult<(WinnerOutcome, Vec<Award>)> {
        let outcome = self.handle(guild_id).await.record_winner(entrant).await?;

        let awards = match &outcome.progress {
            RoundProgress::Complete(report) => self
                .points
                .write()
                .await
                .award_placements(guild_id, &report.placements),
            _ => Vec::new(),
        };

        Ok((outcome, awards))
    }

    pub async fn points(&self, guild_id: GuildId, member: u64) -> (u64, Rank) {
        let points = self.points.read().await;
        (
            points.balance(guild_id, member),
            points.rank(guild_id, member),
        )
    }

    pub async fn leaderboard(&self, guild_id: GuildId, limit: usize) -> Vec<(u64, u64)> {
        self.points.read().await.leaderboard(guild_id, limit)
    }

    pub async fn reset_points(&self, guild_id: GuildId) -> bool {
        self.points.write().await.reset_guild(guild_id)
    }

    /// Number of guilds with a running actor
    pub async fn active_count(&self) -> usize {
        self.tournaments
            .read()
            .await
            .values()
            .filter(|handle| !handle.is_closed())
            .count()
    }

    /// Restore tournaments and points from the store, replacing running actors
    ///
    /// # Returns
    ///
    /// * `RegistryResult<usize>` - Number of tournaments restored
    pub async fn load(&self) -> RegistryResult<usize> {
        let Some(snapshot) = self.store.load().await? else {
            log::info!("No tournament snapshot found, starting empty");
            return Ok(0);
        };

        let mut tournaments = self.tournaments.write().await;
        for handle in tournaments.values() {
            let _ = handle.close().await;
        }
        tournaments.clear();

        let restored = snapshot.tournaments.len();
        for (guild_id, tournament) in snapshot.tournaments {
            tournaments.insert(guild_id, self.spawn(guild_id, tournament));
        }
        *self.points.write().await = snapshot.points;

        log::info!(
            "Restored {} tournaments from snapshot saved at {}",
            restored,
            snapshot.saved_at
        );
        Ok(restored)
    }

    /// Save every guild's tournament and the points ledger
    ///
    /// # Returns
    ///
    /// * `RegistryResult<usize>` - Number of tournaments saved
    pub async fn checkpoint(&self) -> RegistryResult<usize> {
        let handles: Vec<TournamentHandle> =
            self.tournaments.read().await.values().cloned().collect();

        let mut tournaments = HashMap::with_capacity(handles.len());
        for handle in handles {
            match handle.snapshot().await {
                Ok(tournament) => {
                    tournaments.insert(handle.guild_id(), tournament);
                }
                Err(e) => log::warn!("Skipping guild {} in checkpoint: {}", handle.guild_id(), e),
            }
        }

        let saved = tournaments.len();
        let snapshot = RegistrySnapshot::new(tournaments, self.points.read().await.clone());
        self.store.save(&snapshot).await?;

        log::info!("Checkpointed {} tournaments", saved);
        Ok(saved)
    }

    /// Checkpoint, then stop every actor
    pub async fn shutdown(&self) -> RegistryResult<usize> {
        let saved = self.checkpoint().await?;

        let mut tournaments = self.tournaments.write().await;
        for (guild_id, handle) in tournaments.drain() {
            if let Err(e) = handle.close().await {
                log::warn!("Guild {} actor already stopped: {}", guild_id, e);
            }
        }

        log::info!("Tournament registry shut down");
        Ok(saved)
    }
}
