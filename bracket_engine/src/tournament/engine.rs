//! The tournament aggregate and its lifecycle operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{
    errors::{BracketError, BracketResult},
    models::{
        Competitor, Entrant, EntrantId, Format, Mode, Placement, RewardTable, Round, Team,
        TournamentMetadata, TournamentState,
    },
    placement::compute_placements,
    seeding::Seeder,
    teams::{InviteId, PendingInvite, TeamBook},
};

/// Minimum field size for a bracket
pub const MIN_COMPETITORS: usize = 2;

/// Roster change after a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Entrants added (both members in 2v2)
    pub added: Vec<EntrantId>,
    pub mode: Mode,
    pub roster_len: usize,
    pub capacity: usize,
}

/// Roster change after an unregistration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Entrants removed (both members in 2v2)
    pub removed: Vec<EntrantId>,
    pub mode: Mode,
    pub roster_len: usize,
    pub capacity: usize,
}

/// Result of leaving a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDeparture {
    pub team: Team,
    /// Whether the team was registered and got removed from the roster
    pub withdrawn: bool,
}

/// Result of starting a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSummary {
    pub round: Round,
    /// Entrants in 1v1, teams in 2v2
    pub competitors: usize,
}

/// Everything a caller needs to announce a finished tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub metadata: TournamentMetadata,
    pub mode: Mode,
    pub placements: Vec<Placement>,
    pub rounds_played: u32,
}

/// What a recorded result did to the bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundProgress {
    /// Current round still has undecided bouts
    Pending { remaining: usize },
    /// Round finished and the next one was paired
    Advanced(Round),
    /// Final decided; the tournament has already been reset
    Complete(CompletionReport),
}

/// Result of recording a winner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerOutcome {
    pub round_number: u32,
    pub bout_index: usize,
    pub winner: Competitor,
    pub loser: Competitor,
    pub progress: RoundProgress,
}

/// One guild's single-elimination tournament.
///
/// The whole aggregate serializes, so a caller can checkpoint it and restore
/// it later. The reward table is policy rather than state and survives resets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tournament {
    state: TournamentState,
    format: Option<Format>,
    metadata: TournamentMetadata,
    roster: Vec<Entrant>,
    teams: TeamBook,
    round_index: u32,
    rounds: Vec<Round>,
    advancing: Vec<Competitor>,
    eliminated: Vec<Competitor>,
    fillers_created: u32,
    rewards: RewardTable,
}

impl Tournament {
    /// Create an unconfigured tournament
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unconfigured tournament with a custom reward table
    pub fn with_rewards(rewards: RewardTable) -> Self {
        Self {
            rewards,
            ..Self::default()
        }
    }

    pub fn state(&self) -> TournamentState {
        self.state
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn mode(&self) -> Option<Mode> {
        self.format.map(|format| format.mode)
    }

    pub fn metadata(&self) -> &TournamentMetadata {
        &self.metadata
    }

    pub fn roster(&self) -> &[Entrant] {
        &self.roster
    }

    pub fn teams(&self) -> &TeamBook {
        &self.teams
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// Winners of the current round, in decision order
    pub fn advancing(&self) -> &[Competitor] {
        &self.advancing
    }

    /// Losers so far, most recent last
    pub fn eliminated(&self) -> &[Competitor] {
        &self.eliminated
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    pub fn set_rewards(&mut self, rewards: RewardTable) {
        self.rewards = rewards;
    }

    pub fn is_registered(&self, id: EntrantId) -> bool {
        self.roster.iter().any(|entrant| entrant.id() == id)
    }

    /// Free roster slots; 0 when unconfigured
    pub fn remaining_capacity(&self) -> usize {
        self.format
            .map(|format| format.capacity.get().saturating_sub(self.roster.len()))
            .unwrap_or(0)
    }

    /// Competitors currently on the roster (teams in 2v2)
    pub fn competitor_count(&self) -> usize {
        match self.mode() {
            Some(mode) => self.roster.len() / mode.team_size(),
            None => 0,
        }
    }

    /// Reset everything and open registration.
    ///
    /// # Arguments
    ///
    /// * `mode` - 1v1 or 2v2
    /// * `capacity` - Entrant slots, one of 2, 4, 8, 16 or 32
    /// * `metadata` - Display-only details
    ///
    /// # Returns
    ///
    /// * `BracketResult<Format>` - The validated format; on error nothing changes
    pub fn configure(
        &mut self,
        mode: Mode,
        capacity: usize,
        metadata: TournamentMetadata,
    ) -> BracketResult<Format> {
        let format = Format::new(mode, capacity)?;

        self.reset();
        self.state = TournamentState::Configured;
        self.format = Some(format);
        self.metadata = metadata;

        log::info!(
            "Tournament '{}' configured as {}",
            self.metadata.title,
            format
        );
        Ok(format)
    }

    /// Add an entrant to the roster.
    ///
    /// In 2v2 the entrant's confirmed team is added as a whole, or nothing is.
    pub fn register(&mut self, entrant: Entrant) -> BracketResult<Registration> {
        let format = self.ensure_configured()?;
        let id = entrant.id();
        if self.is_registered(id) {
            return Err(BracketError::DuplicateEntrant(id));
        }

        let capacity = format.capacity.get();
        let newcomers = match format.mode {
            Mode::Solo => vec![entrant],
            Mode::Duo => {
                let team = self.teams.team_of(id).ok_or(BracketError::NoTeam(id))?;
                if let Some(member) = team.members().iter().find(|m| self.is_registered(m.id())) {
                    return Err(BracketError::DuplicateEntrant(member.id()));
                }
                team.members().to_vec()
            }
        };

        if self.roster.len() + newcomers.len() > capacity {
            return Err(BracketError::Full { capacity });
        }

        let added: Vec<EntrantId> = newcomers.iter().map(Entrant::id).collect();
        self.roster.extend(newcomers);
        log::info!(
            "Registered {:?} for '{}' ({}/{})",
            added,
            self.metadata.title,
            self.roster.len(),
            capacity
        );

        Ok(Registration {
            added,
            mode: format.mode,
            roster_len: self.roster.len(),
            capacity,
        })
    }

    /// Remove an entrant from the roster; in 2v2 their teammate goes too
    pub fn unregister(&mut self, id: EntrantId) -> BracketResult<Withdrawal> {
        let format = self.ensure_configured()?;
        if !self.is_registered(id) {
            return Err(BracketError::NotRegistered(id));
        }

        let removed = match (format.mode, self.teams.team_of(id)) {
            (Mode::Duo, Some(team)) => team.ids().to_vec(),
            _ => vec![id],
        };
        self.roster
            .retain(|entrant| !removed.contains(&entrant.id()));
        log::info!("Unregistered {:?} from '{}'", removed, self.metadata.title);

        Ok(Withdrawal {
            removed,
            mode: format.mode,
            roster_len: self.roster.len(),
            capacity: format.capacity.get(),
        })
    }

    /// Send a team invite (2v2 only)
    pub fn propose_team(
        &mut self,
        inviter: Entrant,
        invitee: Entrant,
    ) -> BracketResult<PendingInvite> {
        self.ensure_team_phase()?;
        let invite = self.teams.propose(inviter, invitee, Utc::now())?;
        log::debug!(
            "{} invited {} ({})",
            invite.inviter.id(),
            invite.invitee.id(),
            invite.id
        );
        Ok(invite)
    }

    /// Accept the invite addressed to `invitee` (2v2 only)
    pub fn accept_invite(&mut self, invitee: EntrantId) -> BracketResult<Team> {
        self.ensure_team_phase()?;
        let team = self.teams.accept(invitee)?;
        let [first, second] = team.ids();
        log::info!("Team formed: {} & {}", first, second);
        Ok(team)
    }

    /// Decline the invite addressed to `invitee`; `None` if there was none
    pub fn reject_invite(&mut self, invitee: EntrantId) -> Option<PendingInvite> {
        self.teams.reject(invitee)
    }

    /// Drop an invite whose time ran out; `None` if it was already resolved
    pub fn expire_invite(&mut self, invite: InviteId) -> Option<PendingInvite> {
        let expired = self.teams.expire(invite);
        if let Some(pending) = &expired {
            log::debug!("{} to {} expired", pending.id, pending.invitee.id());
        }
        expired
    }

    /// Drop every invite issued before `cutoff`
    pub fn expire_invites_before(&mut self, cutoff: DateTime<Utc>) -> Vec<PendingInvite> {
        self.teams.expire_older_than(cutoff)
    }

    /// Dissolve the member's team, unregistering it if it was on the roster.
    ///
    /// Returns `Ok(None)` when the member has no team. Not allowed once the
    /// bracket is running.
    pub fn leave_team(&mut self, member: EntrantId) -> BracketResult<Option<TeamDeparture>> {
        if self.state == TournamentState::Active {
            return Err(BracketError::AlreadyStarted);
        }

        let Some(team) = self.teams.dissolve(member) else {
            return Ok(None);
        };

        let before = self.roster.len();
        self.roster.retain(|entrant| !team.contains(entrant.id()));
        let withdrawn = self.roster.len() != before;
        log::info!(
            "{} left their team (withdrawn from roster: {})",
            member,
            withdrawn
        );

        Ok(Some(TeamDeparture { team, withdrawn }))
    }

    /// Add `count` synthetic fillers to the roster.
    ///
    /// In 2v2 the count is rounded up to even and the fillers are paired into
    /// teams in creation order. Either every filler fits or none is added.
    ///
    /// # Returns
    ///
    /// * `BracketResult<Vec<EntrantId>>` - Ids of the fillers added
    pub fn fill_with_synthetic(&mut self, count: usize) -> BracketResult<Vec<EntrantId>> {
        let format = self.ensure_configured()?;
        let requested = match format.mode {
            Mode::Solo => count,
            Mode::Duo => count + count % 2,
        };

        let remaining = self.remaining_capacity();
        if requested > remaining {
            return Err(BracketError::InsufficientCapacityForFill {
                requested,
                remaining,
            });
        }

        let fillers: Vec<Entrant> = (0..requested).map(|_| self.next_filler()).collect();
        if format.mode == Mode::Duo {
            for pair in fillers.chunks_exact(2) {
                self.teams
                    .insert_team(Self::filler_team(&pair[0], &pair[1])?);
            }
        }

        let added: Vec<EntrantId> = fillers.iter().map(Entrant::id).collect();
        self.roster.extend(fillers);
        if !added.is_empty() {
            log::info!(
                "Added {} fillers to '{}' ({} slots left)",
                added.len(),
                self.metadata.title,
                self.remaining_capacity()
            );
        }

        Ok(added)
    }

    /// Shuffle the field, pair round 1 and lock the roster.
    ///
    /// The field must be a power of two so that every later round pairs
    /// evenly. Top the roster up with [`Tournament::fill_with_synthetic`]
    /// first otherwise.
    pub fn start(&mut self, seeder: &mut Seeder) -> BracketResult<StartSummary> {
        let format = self.ensure_configured()?;
        let mut field = self.build_field(format.mode)?;
        if field.len() < MIN_COMPETITORS {
            return Err(BracketError::NotEnoughEntrants {
                needed: MIN_COMPETITORS,
                current: field.len(),
            });
        }
        if !field.len().is_power_of_two() {
            return Err(BracketError::UnbalancedField {
                current: field.len(),
                needed: field.len().next_power_of_two(),
            });
        }

        seeder.shuffle(&mut field);
        let competitors = field.len();

        let round = Round::pair(1, field)?;
        self.state = TournamentState::Active;
        self.round_index = 1;
        self.rounds = vec![round.clone()];
        self.advancing.clear();
        self.eliminated.clear();

        log::info!(
            "Tournament '{}' started with {} bouts",
            self.metadata.title,
            round.bouts.len()
        );

        Ok(StartSummary { round, competitors })
    }

    /// Record the winner of the undecided current-round bout containing `id`.
    ///
    /// When this completes the round, either the next round is paired from the
    /// winners in decision order, or the tournament finishes and resets.
    pub fn record_winner(&mut self, id: EntrantId) -> BracketResult<WinnerOutcome> {
        if self.state != TournamentState::Active {
            return Err(BracketError::NotActive);
        }

        let round_number = self.round_index;
        let round = self.rounds.last_mut().ok_or_else(|| {
            log::error!("Active tournament without rounds");
            BracketError::InternalState("active tournament without rounds".to_string())
        })?;

        let (bout_index, side) = round
            .bouts
            .iter()
            .enumerate()
            .filter(|(_, bout)| !bout.is_decided())
            .find_map(|(index, bout)| bout.side_of(id).map(|side| (index, side)))
            .ok_or(BracketError::NotInCurrentRound(id))?;

        let winners = self.advancing.len() + 1;
        if round.undecided_count() == 1 && winners > 1 && winners % 2 == 1 {
            log::error!(
                "Round {} of '{}' would close with {} winners",
                round_number,
                self.metadata.title,
                winners
            );
            return Err(BracketError::InternalState(format!(
                "round {round_number} would close with {winners} winners"
            )));
        }

        let bout = &mut round.bouts[bout_index];
        if !bout.decide(side) {
            return Err(BracketError::NotInCurrentRound(id));
        }
        let winner = bout.competitor(side).clone();
        let loser = bout.competitor(side.opposite()).clone();
        let remaining = round.undecided_count();

        log::debug!(
            "Round {} bout {}: {} beat {}",
            round_number,
            bout_index + 1,
            winner.lead_id(),
            loser.lead_id()
        );

        self.eliminated.push(loser.clone());
        self.advancing.push(winner.clone());

        let progress = if remaining > 0 {
            RoundProgress::Pending { remaining }
        } else if self.advancing.len() == 1 {
            RoundProgress::Complete(self.finish()?)
        } else {
            RoundProgress::Advanced(self.advance()?)
        };

        Ok(WinnerOutcome {
            round_number,
            bout_index,
            winner,
            loser,
            progress,
        })
    }

    /// Reset to unconfigured from any state.
    ///
    /// # Returns
    ///
    /// * `TournamentState` - The state before cancelling
    pub fn cancel(&mut self) -> TournamentState {
        let previous = self.state;
        if previous != TournamentState::Unconfigured {
            log::info!(
                "Tournament '{}' cancelled while {}",
                self.metadata.title,
                previous
            );
        }
        self.reset();
        previous
    }

    fn reset(&mut self) {
        let rewards = std::mem::take(&mut self.rewards);
        *self = Self::with_rewards(rewards);
    }

    fn ensure_configured(&self) -> BracketResult<Format> {
        match self.state {
            TournamentState::Unconfigured => Err(BracketError::NotConfigured),
            TournamentState::Active | TournamentState::Complete => {
                Err(BracketError::AlreadyStarted)
            }
            TournamentState::Configured => self.format.ok_or_else(|| {
                log::error!("Configured tournament without a format");
                BracketError::InternalState("configured tournament without a format".to_string())
            }),
        }
    }

    fn ensure_team_phase(&self) -> BracketResult<()> {
        match self.ensure_configured()?.mode {
            Mode::Duo => Ok(()),
            Mode::Solo => Err(BracketError::WrongMode),
        }
    }

    /// Group the roster into competitors, preserving roster order
    fn build_field(&self, mode: Mode) -> BracketResult<Vec<Competitor>> {
        match mode {
            Mode::Solo => Ok(self.roster.iter().cloned().map(Competitor::Solo).collect()),
            Mode::Duo => {
                let mut grouped: HashSet<EntrantId> = HashSet::new();
                let mut field = Vec::with_capacity(self.roster.len() / 2);
                for entrant in &self.roster {
                    let id = entrant.id();
                    if grouped.contains(&id) {
                        continue;
                    }
                    let team = self.teams.team_of(id).ok_or_else(|| {
                        log::error!("Roster member {} has no team", id);
                        BracketError::InternalState(format!("roster member {id} has no team"))
                    })?;
                    let missing = team.ids().into_iter().find(|m| !self.is_registered(*m));
                    if let Some(missing) = missing {
                        log::error!("Team of {} registered without {}", id, missing);
                        return Err(BracketError::InternalState(format!(
                            "team of {id} is missing {missing} on the roster"
                        )));
                    }
                    grouped.extend(team.ids());
                    field.push(Competitor::Duo(team.clone()));
                }
                Ok(field)
            }
        }
    }

    fn next_filler(&mut self) -> Entrant {
        self.fillers_created += 1;
        Entrant::filler(self.fillers_created)
    }

    fn filler_team(first: &Entrant, second: &Entrant) -> BracketResult<Team> {
        Team::new(first.clone(), second.clone()).ok_or_else(|| {
            BracketError::InternalState(format!("filler {} paired with itself", first.id()))
        })
    }

    /// Pair the winners of the finished round, never reshuffling
    fn advance(&mut self) -> BracketResult<Round> {
        let field = std::mem::take(&mut self.advancing);
        let round = Round::pair(self.round_index + 1, field)?;
        self.round_index = round.number;
        self.rounds.push(round.clone());
        log::info!(
            "Tournament '{}' advanced to round {} ({} bouts)",
            self.metadata.title,
            round.number,
            round.bouts.len()
        );
        Ok(round)
    }

    /// Compute placements, mark complete, then reset
    fn finish(&mut self) -> BracketResult<CompletionReport> {
        let mode = self.mode().ok_or_else(|| {
            BracketError::InternalState("active tournament without a mode".to_string())
        })?;
        let champion = self.advancing.pop().ok_or_else(|| {
            BracketError::InternalState("final decided without a winner".to_string())
        })?;

        self.state = TournamentState::Complete;
        let report = CompletionReport {
            metadata: self.metadata.clone(),
            mode,
            placements: compute_placements(&champion, &self.eliminated, &self.rewards),
            rounds_played: self.round_index,
        };
        log::info!(
            "Tournament '{}' complete after {} rounds, won by {}",
            report.metadata.title,
            report.rounds_played,
            champion.lead_id()
        );

        self.reset();
        Ok(report)
    }
}
