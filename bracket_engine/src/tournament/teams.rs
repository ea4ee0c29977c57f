//! Confirmed teams and pending invites for 2v2 brackets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    errors::{BracketError, BracketResult},
    models::{Entrant, EntrantId, Team},
};

/// Identifier handed out per invite so a late expiry can't clear a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteId(pub u64);

impl fmt::Display for InviteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invite#{}", self.0)
    }
}

/// An unanswered team invite, keyed by invitee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvite {
    pub id: InviteId,
    pub inviter: Entrant,
    pub invitee: Entrant,
    pub issued_at: DateTime<Utc>,
}

/// Teams and invites of one tournament.
///
/// An entrant is in at most one team, and has at most one pending invite
/// addressed to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBook {
    teams: Vec<Team>,
    invites: Vec<PendingInvite>,
    next_invite: u64,
}

impl TeamBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn invites(&self) -> &[PendingInvite] {
        &self.invites
    }

    pub fn team_of(&self, id: EntrantId) -> Option<&Team> {
        self.teams.iter().find(|team| team.contains(id))
    }

    pub fn has_team(&self, id: EntrantId) -> bool {
        self.team_of(id).is_some()
    }

    /// Pending invite addressed to `invitee`
    pub fn pending_for(&self, invitee: EntrantId) -> Option<&PendingInvite> {
        self.invites
            .iter()
            .find(|invite| invite.invitee.id() == invitee)
    }

    /// Create a pending invite from `inviter` to `invitee`.
    ///
    /// # Arguments
    ///
    /// * `inviter` - Entrant sending the invite
    /// * `invitee` - Entrant receiving it; must be real
    /// * `now` - Issue time, used for expiry bookkeeping
    ///
    /// # Returns
    ///
    /// * `BracketResult<PendingInvite>` - The stored invite
    pub fn propose(
        &mut self,
        inviter: Entrant,
        invitee: Entrant,
        now: DateTime<Utc>,
    ) -> BracketResult<PendingInvite> {
        if inviter.id() == invitee.id() {
            return Err(BracketError::SelfInvite);
        }
        if invitee.is_synthetic() {
            return Err(BracketError::SyntheticInvitee);
        }
        for party in [&inviter, &invitee] {
            if self.has_team(party.id()) {
                return Err(BracketError::AlreadyTeamed(party.id()));
            }
        }
        if self.pending_for(invitee.id()).is_some() {
            return Err(BracketError::InvitePending(invitee.id()));
        }

        self.next_invite += 1;
        let invite = PendingInvite {
            id: InviteId(self.next_invite),
            inviter,
            invitee,
            issued_at: now,
        };
        self.invites.push(invite.clone());
        Ok(invite)
    }

    /// Accept the invite addressed to `invitee` and form the team.
    ///
    /// Both parties are re-checked since either may have joined another team
    /// after the invite was issued. Any other invite addressed to either party
    /// is dropped along with the accepted one.
    pub fn accept(&mut self, invitee: EntrantId) -> BracketResult<Team> {
        let invite = self
            .pending_for(invitee)
            .cloned()
            .ok_or(BracketError::NoPendingInvite(invitee))?;

        for party in [&invite.inviter, &invite.invitee] {
            if self.has_team(party.id()) {
                self.remove_invite(invite.id);
                return Err(BracketError::AlreadyTeamed(party.id()));
            }
        }

        let team = Team::new(invite.inviter.clone(), invite.invitee.clone())
            .ok_or(BracketError::SelfInvite)?;
        let parties = team.ids();
        self.invites
            .retain(|pending| !parties.contains(&pending.invitee.id()));
        self.teams.push(team.clone());
        Ok(team)
    }

    /// Drop the invite addressed to `invitee`, if any
    pub fn reject(&mut self, invitee: EntrantId) -> Option<PendingInvite> {
        let position = self
            .invites
            .iter()
            .position(|invite| invite.invitee.id() == invitee)?;
        Some(self.invites.remove(position))
    }

    /// Drop the invite with this id. A no-op once it was accepted or rejected.
    pub fn expire(&mut self, invite: InviteId) -> Option<PendingInvite> {
        self.remove_invite(invite)
    }

    /// Drop every invite issued before `cutoff`
    pub fn expire_older_than(&mut self, cutoff: DateTime<Utc>) -> Vec<PendingInvite> {
        let (expired, kept) = std::mem::take(&mut self.invites)
            .into_iter()
            .partition(|invite| invite.issued_at < cutoff);
        self.invites = kept;
        expired
    }

    /// Remove the team containing `member`
    pub fn dissolve(&mut self, member: EntrantId) -> Option<Team> {
        let position = self.teams.iter().position(|team| team.contains(member))?;
        Some(self.teams.remove(position))
    }

    /// Register a team that skipped the invite protocol (fillers)
    pub(crate) fn insert_team(&mut self, team: Team) {
        self.teams.push(team);
    }

    fn remove_invite(&mut self, invite: InviteId) -> Option<PendingInvite> {
        let position = self.invites.iter().position(|pending| pending.id == invite)?;
        Some(self.invites.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn member(id: u64) -> Entrant {
        Entrant::member(id, format!("m{id}"))
    }

    #[test]
    fn test_propose_and_accept() {
        let mut book = TeamBook::new();
        let invite = book.propose(member(1), member(2), Utc::now()).unwrap();
        assert_eq!(invite.id, InviteId(1));
        assert!(book.pending_for(EntrantId::Member(2)).is_some());

        let team = book.accept(EntrantId::Member(2)).unwrap();
        assert!(team.contains(EntrantId::Member(1)));
        assert!(book.invites().is_empty());
        assert_eq!(book.team_of(EntrantId::Member(1)), Some(&team));
        assert_eq!(book.team_of(EntrantId::Member(2)), Some(&team));
    }

    #[test]
    fn test_propose_guards() {
        let mut book = TeamBook::new();
        let now = Utc::now();
        assert_eq!(
            book.propose(member(1), member(1), now),
            Err(BracketError::SelfInvite)
        );
        assert_eq!(
            book.propose(member(1), Entrant::filler(1), now),
            Err(BracketError::SyntheticInvitee)
        );

        book.propose(member(1), member(2), now).unwrap();
        assert_eq!(
            book.propose(member(3), member(2), now),
            Err(BracketError::InvitePending(EntrantId::Member(2)))
        );

        book.accept(EntrantId::Member(2)).unwrap();
        assert_eq!(
            book.propose(member(1), member(4), now),
            Err(BracketError::AlreadyTeamed(EntrantId::Member(1)))
        );
        assert_eq!(
            book.propose(member(4), member(2), now),
            Err(BracketError::AlreadyTeamed(EntrantId::Member(2)))
        );
    }

    #[test]
    fn test_accept_revalidates_inviter() {
        let mut book = TeamBook::new();
        let now = Utc::now();
        book.propose(member(1), member(2), now).unwrap();
        book.propose(member(1), member(3), now).unwrap();

        book.accept(EntrantId::Member(3)).unwrap();
        assert_eq!(
            book.accept(EntrantId::Member(2)),
            Err(BracketError::AlreadyTeamed(EntrantId::Member(1)))
        );
        assert!(book.pending_for(EntrantId::Member(2)).is_none());
    }

    #[test]
    fn test_accept_clears_invites_addressed_to_inviter() {
        let mut book = TeamBook::new();
        let now = Utc::now();
        book.propose(member(3), member(1), now).unwrap();
        book.propose(member(1), member(2), now).unwrap();

        book.accept(EntrantId::Member(2)).unwrap();
        assert!(book.invites().is_empty());
    }

    #[test]
    fn test_reject_and_expire_are_soft() {
        let mut book = TeamBook::new();
        assert!(book.reject(EntrantId::Member(2)).is_none());

        let invite = book.propose(member(1), member(2), Utc::now()).unwrap();
        assert_eq!(book.reject(EntrantId::Member(2)), Some(invite.clone()));
        assert!(book.expire(invite.id).is_none());
    }

    #[test]
    fn test_expire_does_not_touch_newer_invite() {
        let mut book = TeamBook::new();
        let now = Utc::now();
        let first = book.propose(member(1), member(2), now).unwrap();
        book.reject(EntrantId::Member(2));
        let second = book.propose(member(1), member(2), now).unwrap();

        assert!(book.expire(first.id).is_none());
        assert_eq!(book.pending_for(EntrantId::Member(2)), Some(&second));
    }

    #[test]
    fn test_expire_older_than() {
        let mut book = TeamBook::new();
        let now = Utc::now();
        book.propose(member(1), member(2), now - Duration::seconds(400))
            .unwrap();
        book.propose(member(3), member(4), now).unwrap();

        let expired = book.expire_older_than(now - Duration::seconds(300));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].invitee.id(), EntrantId::Member(2));
        assert_eq!(book.invites().len(), 1);
    }

    #[test]
    fn test_dissolve() {
        let mut book = TeamBook::new();
        book.propose(member(1), member(2), Utc::now()).unwrap();
        book.accept(EntrantId::Member(2)).unwrap();

        assert!(book.dissolve(EntrantId::Member(5)).is_none());
        assert!(book.dissolve(EntrantId::Member(1)).is_some());
        assert!(!book.has_team(EntrantId::Member(2)));
    }
}
