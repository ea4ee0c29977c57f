//! Tournament actor implementation with async message handling.

use chrono::{TimeDelta, Utc};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use super::{
    config::RegistryConfig,
    errors::{RegistryError, RegistryResult},
    messages::TournamentMessage,
};
use crate::tournament::{
    Entrant, EntrantId, Format, GuildId, InviteId, Mode, PendingInvite, Registration, Seeder,
    StartSummary, Team, TeamDeparture, Tournament, TournamentMetadata, TournamentState,
    WinnerOutcome, Withdrawal,
};

/// Tournament actor handle for sending messages
#[derive(Clone)]
pub struct TournamentHandle {
    sender: mpsc::Sender<TournamentMessage>,
    guild_id: GuildId,
}

impl TournamentHandle {
    /// Create a new tournament handle
    pub fn new(sender: mpsc::Sender<TournamentMessage>, guild_id: GuildId) -> Self {
        Self { sender, guild_id }
    }

    /// Get guild ID
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Whether the actor behind this handle has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the tournament
    pub async fn send(&self, message: TournamentMessage) -> RegistryResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RegistryError::ActorUnavailable(self.guild_id))
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> TournamentMessage,
    ) -> RegistryResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await
            .map_err(|_| RegistryError::ActorUnavailable(self.guild_id))
    }

    pub async fn configure(
        &self,
        mode: Mode,
        capacity: usize,
        metadata: TournamentMetadata,
    ) -> RegistryResult<Format> {
        Ok(self
            .request(|response| TournamentMessage::Configure {
                mode,
                capacity,
                metadata,
                response,
            })
            .await??)
    }

    pub async fn register(&self, entrant: Entrant) -> RegistryResult<Registration> {
        Ok(self
            .request(|response| TournamentMessage::Register { entrant, response })
            .await??)
    }

    pub async fn unregister(&self, entrant: EntrantId) -> RegistryResult<Withdrawal> {
        Ok(self
            .request(|response| TournamentMessage::Unregister { entrant, response })
            .await??)
    }

    pub async fn propose_team(
        &self,
        inviter: Entrant,
        invitee: Entrant,
    ) -> RegistryResult<PendingInvite> {
        Ok(self
            .request(|response| TournamentMessage::ProposeTeam {
                inviter,
                invitee,
                response,
            })
            .await??)
    }

    pub async fn accept_invite(&self, invitee: EntrantId) -> RegistryResult<Team> {
        Ok(self
            .request(|response| TournamentMessage::AcceptInvite { invitee, response })
            .await??)
    }

    pub async fn reject_invite(&self, invitee: EntrantId) -> RegistryResult<Option<PendingInvite>> {
        self.request(|response| TournamentMessage::RejectInvite { invitee, response })
            .await
    }

    pub async fn leave_team(&self, member: EntrantId) -> RegistryResult<Option<TeamDeparture>> {
        Ok(self
            .request(|response| TournamentMessage::LeaveTeam { member, response })
            .await??)
    }

    pub async fn fill_with_synthetic(&self, count: usize) -> RegistryResult<Vec<EntrantId>> {
        Ok(self
            .request(|response| TournamentMessage::FillSynthetic { count, response })
            .await??)
    }

    pub async fn start(&self) -> RegistryResult<StartSummary> {
        Ok(self
            .request(|response| TournamentMessage::Start { response })
            .await??)
    }

    pub async fn record_winner(&self, entrant: EntrantId) -> RegistryResult<WinnerOutcome> {
        Ok(self
            .request(|response| TournamentMessage::RecordWinner { entrant, response })
            .await??)
    }

    pub async fn cancel(&self) -> RegistryResult<TournamentState> {
        self.request(|response| TournamentMessage::Cancel { response })
            .await
    }

    pub async fn snapshot(&self) -> RegistryResult<Tournament> {
        self.request(|response| TournamentMessage::GetSnapshot { response })
            .await
    }

    /// Stop the actor and get its final state
    pub async fn close(&self) -> RegistryResult<Tournament> {
        self.request(|response| TournamentMessage::Close { response })
            .await
    }
}

/// Actor owning one guild's tournament.
///
/// Messages are handled one at a time, so every engine operation runs without
/// interleaving.
pub struct TournamentActor {
    /// Guild ID
    guild_id: GuildId,

    /// Bracket state
    tournament: Tournament,

    /// Message inbox
    inbox: mpsc::Receiver<TournamentMessage>,

    /// Used by invite timers to post back without keeping the actor alive
    mailbox: mpsc::WeakSender<TournamentMessage>,

    /// Round-1 shuffle source
    seeder: Seeder,

    /// Invite time-to-live
    invite_ttl: Duration,

    /// Is actor closed
    is_closed: bool,
}

impl TournamentActor {
    /// Create a new tournament actor
    ///
    /// # Arguments
    ///
    /// * `guild_id` - Guild the tournament belongs to
    /// * `tournament` - Initial state, fresh or restored from a snapshot
    /// * `config` - Registry configuration
    ///
    /// # Returns
    ///
    /// * `(TournamentActor, TournamentHandle)` - Actor to spawn and its handle
    pub fn new(
        guild_id: GuildId,
        mut tournament: Tournament,
        config: &RegistryConfig,
    ) -> (Self, TournamentHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        let handle = TournamentHandle::new(sender.clone(), guild_id);
        tournament.set_rewards(config.rewards.clone());

        let actor = Self {
            guild_id,
            tournament,
            inbox,
            mailbox: sender.downgrade(),
            seeder: Seeder::new(),
            invite_ttl: config.invite_ttl(),
            is_closed: false,
        };

        (actor, handle)
    }

    /// Use a fixed seed for round-1 shuffles
    pub fn with_seeder(mut self, seeder: Seeder) -> Self {
        self.seeder = seeder;
        self
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        log::info!(
            "Tournament actor for guild {} starting ({})",
            self.guild_id,
            self.tournament.state()
        );
        self.resume_invite_timers();

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.is_closed {
                break;
            }
        }

        log::info!("Tournament actor for guild {} closed", self.guild_id);
    }

    fn handle_message(&mut self, message: TournamentMessage) {
        match message {
            TournamentMessage::Configure {
                mode,
                capacity,
                metadata,
                response,
            } => {
                let _ = response.send(self.tournament.configure(mode, capacity, metadata));
            }

            TournamentMessage::Register { entrant, response } => {
                let _ = response.send(self.tournament.register(entrant));
            }

            TournamentMessage::Unregister { entrant, response } => {
                let _ = response.send(self.tournament.unregister(entrant));
            }

            TournamentMessage::ProposeTeam {
                inviter,
                invitee,
                response,
            } => {
                let result = self.tournament.propose_team(inviter, invitee);
                if let Ok(invite) = &result {
                    self.schedule_expiry(invite.id, self.invite_ttl);
                }
                let _ = response.send(result);
            }

            TournamentMessage::AcceptInvite { invitee, response } => {
                let _ = response.send(self.tournament.accept_invite(invitee));
            }

            TournamentMessage::RejectInvite { invitee, response } => {
                let _ = response.send(self.tournament.reject_invite(invitee));
            }

            TournamentMessage::LeaveTeam { member, response } => {
                let _ = response.send(self.tournament.leave_team(member));
            }

            TournamentMessage::FillSynthetic { count, response } => {
                let _ = response.send(self.tournament.fill_with_synthetic(count));
            }

            TournamentMessage::Start { response } => {
                let _ = response.send(self.tournament.start(&mut self.seeder));
            }

            TournamentMessage::RecordWinner { entrant, response } => {
                let _ = response.send(self.tournament.record_winner(entrant));
            }

            TournamentMessage::Cancel { response } => {
                let _ = response.send(self.tournament.cancel());
            }

            TournamentMessage::GetSnapshot { response } => {
                let _ = response.send(self.tournament.clone());
            }

            TournamentMessage::ExpireInvite { invite } => {
                if let Some(expired) = self.tournament.expire_invite(invite) {
                    log::info!(
                        "Guild {}: invite from {} to {} expired",
                        self.guild_id,
                        expired.inviter.id(),
                        expired.invitee.id()
                    );
                }
            }

            TournamentMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(self.tournament.clone());
            }
        }
    }

    /// Re-arm expiry for invites restored from a snapshot.
    ///
    /// Invites whose TTL ran out while no actor was running are dropped right
    /// away; the rest expire after whatever is left of their TTL.
    fn resume_invite_timers(&mut self) {
        let now = Utc::now();
        let cutoff = TimeDelta::from_std(self.invite_ttl)
            .ok()
            .and_then(|ttl| now.checked_sub_signed(ttl));
        if let Some(cutoff) = cutoff {
            for expired in self.tournament.expire_invites_before(cutoff) {
                log::info!(
                    "Guild {}: invite from {} to {} expired while offline",
                    self.guild_id,
                    expired.inviter.id(),
                    expired.invitee.id()
                );
            }
        }

        let pending: Vec<(InviteId, Duration)> = self
            .tournament
            .teams()
            .invites()
            .iter()
            .map(|invite| {
                let age = (now - invite.issued_at).to_std().unwrap_or_default();
                (invite.id, self.invite_ttl.saturating_sub(age))
            })
            .collect();
        for (invite, remaining) in pending {
            self.schedule_expiry(invite, remaining);
        }
    }

    /// Post `ExpireInvite` back to this actor once `ttl` elapses
    fn schedule_expiry(&self, invite: InviteId, ttl: Duration) {
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(sender) = mailbox.upgrade() {
                let _ = sender
                    .send(TournamentMessage::ExpireInvite { invite })
                    .await;
            }
        });
    }
}
