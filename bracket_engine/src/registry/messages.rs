//! Tournament actor message types.

use tokio::sync::oneshot;

use crate::tournament::{
    BracketResult, Entrant, EntrantId, Format, InviteId, Mode, PendingInvite, Registration,
    StartSummary, Team, TeamDeparture, Tournament, TournamentMetadata, TournamentState,
    WinnerOutcome, Withdrawal,
};

/// Messages that can be sent to a TournamentActor
#[derive(Debug)]
pub enum TournamentMessage {
    /// Reset and open registration
    Configure {
        mode: Mode,
        capacity: usize,
        metadata: TournamentMetadata,
        response: oneshot::Sender<BracketResult<Format>>,
    },

    Register {
        entrant: Entrant,
        response: oneshot::Sender<BracketResult<Registration>>,
    },

    Unregister {
        entrant: EntrantId,
        response: oneshot::Sender<BracketResult<Withdrawal>>,
    },

    /// Send a team invite; the actor schedules its expiry
    ProposeTeam {
        inviter: Entrant,
        invitee: Entrant,
        response: oneshot::Sender<BracketResult<PendingInvite>>,
    },

    AcceptInvite {
        invitee: EntrantId,
        response: oneshot::Sender<BracketResult<Team>>,
    },

    RejectInvite {
        invitee: EntrantId,
        response: oneshot::Sender<Option<PendingInvite>>,
    },

    LeaveTeam {
        member: EntrantId,
        response: oneshot::Sender<BracketResult<Option<TeamDeparture>>>,
    },

    FillSynthetic {
        count: usize,
        response: oneshot::Sender<BracketResult<Vec<EntrantId>>>,
    },

    Start {
        response: oneshot::Sender<BracketResult<StartSummary>>,
    },

    RecordWinner {
        entrant: EntrantId,
        response: oneshot::Sender<BracketResult<WinnerOutcome>>,
    },

    /// Reset from any state; replies with the state before the reset
    Cancel {
        response: oneshot::Sender<TournamentState>,
    },

    /// Copy of the current aggregate, for rendering or checkpoints
    GetSnapshot {
        response: oneshot::Sender<Tournament>,
    },

    /// Posted by the actor's own timer when an invite runs out
    ExpireInvite { invite: InviteId },

    /// Stop the actor; replies with the final aggregate
    Close {
        response: oneshot::Sender<Tournament>,
    },
}
