//! Executes console commands against the registry and renders the replies.

use bracket_engine::{
    display::{self, DecoratedNames, NameResolver},
    points::Award,
    registry::{RegistryError, TournamentHandle, TournamentRegistry},
    tournament::{
        Entrant, EntrantId, GuildId, MIN_COMPETITORS, Round, RoundProgress, Tournament,
        TournamentState, WinnerOutcome,
    },
};
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

use crate::commands::ConsoleCommand;

/// Size of the `top` leaderboard
const LEADERBOARD_SIZE: usize = 10;

const COMMANDS: &str = "\
Commands:
  as <id> <name>                          Act as a member
  create <1v1|2v2> <capacity> [title | map | abilities | prize]
  register | unregister                   Join or leave the roster
  invite <id> [name] | accept | reject    Team invites (2v2)
  leave                                   Dissolve your team
  fill [count]                            Add bots (default: up to capacity)
  start                                   Fill with bots, shuffle and pair round 1
  winner <id | BotN>                      Record a bout winner
  cancel | show                           Reset or show the bracket
  points [id] | top                       Tournament points
  decorate <id> <emoji>                   Add a name decoration
  save | quit";

/// What the console should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Pick a member first with 'as <id> <name>'")]
    NoActingMember,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl SessionError {
    fn client_message(&self) -> String {
        match self {
            SessionError::Registry(err) => err.client_message(),
            other => other.to_string(),
        }
    }
}

/// One operator session bound to a guild
pub struct Console {
    registry: Arc<TournamentRegistry>,
    guild_id: GuildId,
    acting: Option<Entrant>,
    decorations: HashMap<u64, Vec<String>>,
}

impl Console {
    pub fn new(registry: Arc<TournamentRegistry>, guild_id: GuildId) -> Self {
        Self {
            registry,
            guild_id,
            acting: None,
            decorations: HashMap::new(),
        }
    }

    /// Run a command; failures are rendered as user-facing text
    pub async fn execute(&mut self, command: ConsoleCommand) -> Reply {
        match self.dispatch(command).await {
            Ok(reply) => reply,
            Err(e) => {
                log::debug!("Command failed: {}", e);
                Reply::Text(e.client_message())
            }
        }
    }

    async fn dispatch(&mut self, command: ConsoleCommand) -> Result<Reply, SessionError> {
        let handle = self.registry.handle(self.guild_id).await;

        let text = match command {
            ConsoleCommand::Help => COMMANDS.to_string(),
            ConsoleCommand::Quit => return Ok(Reply::Quit),

            ConsoleCommand::Act { member, name } => {
                let entrant = Entrant::member(member, name.clone());
                self.acting = Some(entrant);
                format!("Acting as {name}")
            }

            ConsoleCommand::Create { format, metadata } => {
                let title = metadata.title.clone();
                handle
                    .configure(format.mode, format.capacity.get(), metadata)
                    .await?;
                format!("🏆 {title} created ({format}). Use 'register' to join.")
            }

            ConsoleCommand::Register => {
                let registration = handle.register(self.acting()?.clone()).await?;
                let counter = display::roster_counter(
                    registration.mode,
                    registration.roster_len,
                    registration.capacity,
                );
                format!("✅ Registered! {counter}")
            }

            ConsoleCommand::Unregister => {
                let withdrawal = handle.unregister(self.acting()?.id()).await?;
                let counter = display::roster_counter(
                    withdrawal.mode,
                    withdrawal.roster_len,
                    withdrawal.capacity,
                );
                format!("👋 Unregistered. {counter}")
            }

            ConsoleCommand::Invite { invitee, name } => {
                let invitee = match invitee {
                    EntrantId::Member(id) => {
                        Entrant::member(id, name.unwrap_or_else(|| id.to_string()))
                    }
                    EntrantId::Filler(ordinal) => Entrant::filler(ordinal),
                };
                let inviter = self.acting()?.clone();
                let invite = handle.propose_team(inviter, invitee).await?;
                format!(
                    "📨 {} invited {} to a team. The invite expires in {} seconds.",
                    invite.inviter.display_name(),
                    invite.invitee.display_name(),
                    self.registry.config().invite_ttl_secs
                )
            }

            ConsoleCommand::Accept => {
                let team = handle.accept_invite(self.acting()?.id()).await?;
                let [first, second] = team.members();
                format!(
                    "🤝 Team formed: {} & {}",
                    self.names().display_name(first),
                    self.names().display_name(second)
                )
            }

            ConsoleCommand::Reject => match handle.reject_invite(self.acting()?.id()).await? {
                Some(invite) => {
                    let inviter = invite.inviter.display_name();
                    format!("❌ Declined the invite from {inviter}")
                }
                None => "You don't have a pending invite.".to_string(),
            },

            ConsoleCommand::Leave => match handle.leave_team(self.acting()?.id()).await? {
                Some(departure) if departure.withdrawn => {
                    "Team dissolved and removed from the tournament.".to_string()
                }
                Some(_) => "Team dissolved.".to_string(),
                None => "You are not in a team.".to_string(),
            },

            ConsoleCommand::Fill(count) => {
                let count = match count {
                    Some(count) => count,
                    None => handle.snapshot().await?.remaining_capacity(),
                };
                let added = handle.fill_with_synthetic(count).await?.len();
                let counter = self.counter(&handle).await?;
                format!("🤖 Added {added} bots. {counter}")
            }

            ConsoleCommand::Start => {
                // Top the bracket up with bots so round 1 is a full bracket
                let tournament = handle.snapshot().await?;
                let remaining = tournament.remaining_capacity();
                let added = if tournament.state() == TournamentState::Configured
                    && tournament.competitor_count() >= MIN_COMPETITORS
                    && remaining > 0
                {
                    handle.fill_with_synthetic(remaining).await?.len()
                } else {
                    0
                };

                let summary = handle.start().await?;
                let tournament = handle.snapshot().await?;
                let card = self.round_text(&tournament, &summary.round);
                if added > 0 {
                    format!("🤖 Added {added} bots to fill the bracket.\n\n{card}")
                } else {
                    card
                }
            }

            ConsoleCommand::Winner(entrant) => {
                let (outcome, awards) = self.registry.record_winner(self.guild_id, entrant).await?;
                self.winner_text(&handle, outcome, &awards).await?
            }

            ConsoleCommand::Cancel => match handle.cancel().await? {
                TournamentState::Unconfigured => "There is no tournament to cancel.".to_string(),
                _ => "🛑 Tournament cancelled.".to_string(),
            },

            ConsoleCommand::Show => display::standings(&handle.snapshot().await?, &self.names()),

            ConsoleCommand::Points(member) => {
                let member = match member {
                    Some(member) => member,
                    None => self
                        .acting()?
                        .id()
                        .member_id()
                        .ok_or(SessionError::NoActingMember)?,
                };
                let (points, rank) = self.registry.points(self.guild_id, member).await;
                format!("🏅 {member}: {points} TP ({rank})")
            }

            ConsoleCommand::Top => {
                let leaderboard = self
                    .registry
                    .leaderboard(self.guild_id, LEADERBOARD_SIZE)
                    .await;
                if leaderboard.is_empty() {
                    "No points have been awarded yet.".to_string()
                } else {
                    leaderboard
                        .iter()
                        .enumerate()
                        .map(|(index, (member, points))| {
                            format!("{}. {member}: {points} TP", index + 1)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }

            ConsoleCommand::Decorate { member, emoji } => {
                let emojis = self.decorations.entry(member).or_default();
                emojis.push(emoji);
                format!("✨ {member} now shows {}", emojis.concat())
            }

            ConsoleCommand::Save => {
                let saved = self.registry.checkpoint().await?;
                format!("💾 Saved {saved} tournaments.")
            }
        };

        Ok(Reply::Text(text))
    }

    fn acting(&self) -> Result<&Entrant, SessionError> {
        self.acting.as_ref().ok_or(SessionError::NoActingMember)
    }

    fn names(&self) -> DecoratedNames<'_> {
        DecoratedNames::new(&self.decorations)
    }

    async fn counter(&self, handle: &TournamentHandle) -> Result<String, SessionError> {
        let tournament = handle.snapshot().await?;
        Ok(match tournament.format() {
            Some(format) => display::roster_counter(
                format.mode,
                tournament.roster().len(),
                format.capacity.get(),
            ),
            None => String::new(),
        })
    }

    fn round_text(&self, tournament: &Tournament, round: &Round) -> String {
        match tournament.mode() {
            Some(mode) => display::round_card(tournament.metadata(), mode, round, &self.names()),
            None => String::new(),
        }
    }

    async fn winner_text(
        &self,
        handle: &TournamentHandle,
        outcome: WinnerOutcome,
        awards: &[Award],
    ) -> Result<String, SessionError> {
        let names = self.names();
        let winner = display::competitor_label(&outcome.winner, &names);

        Ok(match outcome.progress {
            RoundProgress::Pending { remaining } => format!(
                "✅ {winner} wins match {} of round {}. {remaining} matches left.",
                outcome.bout_index + 1,
                outcome.round_number
            ),
            RoundProgress::Advanced(round) => {
                let tournament = handle.snapshot().await?;
                format!(
                    "✅ {winner} wins. Round {} is complete!\n\n{}",
                    outcome.round_number,
                    self.round_text(&tournament, &round)
                )
            }
            RoundProgress::Complete(report) => {
                let mut text = display::completion_card(&report, &names, Utc::now());
                for award in awards {
                    text.push_str(&format!(
                        "\n+{} TP for {} (now {})",
                        award.points, award.member, award.balance
                    ));
                }
                text
            }
        })
    }
}
