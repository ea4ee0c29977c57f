//! Text rendering for brackets.
//!
//! Every function here is pure: it maps bracket values to strings and takes a
//! [`NameResolver`] so the caller decides how entrants are named.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::tournament::{
    Bout, Competitor, CompletionReport, Entrant, Mode, Placement, Round, Tournament,
    TournamentMetadata,
};

/// Placeholder shown for undecided bouts
pub const PENDING_WINNER: &str = "Waiting...";

/// Maps an entrant to the name shown in chat
pub trait NameResolver {
    fn display_name(&self, entrant: &Entrant) -> String;
}

impl<F> NameResolver for F
where
    F: Fn(&Entrant) -> String,
{
    fn display_name(&self, entrant: &Entrant) -> String {
        self(entrant)
    }
}

/// Uses the name captured at registration
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNames;

impl NameResolver for PlainNames {
    fn display_name(&self, entrant: &Entrant) -> String {
        entrant.display_name().to_string()
    }
}

/// Appends each member's decoration emojis after their name (`"alice 🔥⭐"`)
#[derive(Debug, Clone, Copy)]
pub struct DecoratedNames<'a> {
    decorations: &'a HashMap<u64, Vec<String>>,
}

impl<'a> DecoratedNames<'a> {
    pub fn new(decorations: &'a HashMap<u64, Vec<String>>) -> Self {
        Self { decorations }
    }
}

impl NameResolver for DecoratedNames<'_> {
    fn display_name(&self, entrant: &Entrant) -> String {
        let name = entrant.display_name();
        match entrant
            .id()
            .member_id()
            .and_then(|id| self.decorations.get(&id))
        {
            Some(emojis) if !emojis.is_empty() => format!("{name} {}", emojis.concat()),
            _ => name.to_string(),
        }
    }
}

/// `"alice"` for a solo competitor, `"alice & bob"` for a team
pub fn competitor_label(competitor: &Competitor, names: &impl NameResolver) -> String {
    competitor
        .members()
        .iter()
        .map(|member| names.display_name(member))
        .collect::<Vec<_>>()
        .join(" & ")
}

/// `"**alice** vs **bob**"`
pub fn bout_matchup(bout: &Bout, names: &impl NameResolver) -> String {
    format!(
        "**{}** vs **{}**",
        competitor_label(&bout.home, names),
        competitor_label(&bout.away, names)
    )
}

/// Winner line of a bout
pub fn bout_status(bout: &Bout, names: &impl NameResolver) -> String {
    match bout.winner() {
        Some(winner) => format!("Winner: {}", competitor_label(winner, names)),
        None => format!("Winner: *{PENDING_WINNER}*"),
    }
}

pub fn round_header(metadata: &TournamentMetadata, round_number: u32) -> String {
    format!("🏆 {} - Round {}", metadata.title, round_number)
}

/// Full announcement for a round
pub fn round_card(
    metadata: &TournamentMetadata,
    mode: Mode,
    round: &Round,
    names: &impl NameResolver,
) -> String {
    let mut lines = vec![
        round_header(metadata, round.number),
        details_line(metadata, mode),
    ];

    for (index, bout) in round.bouts.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("⚔️ Match {}", index + 1));
        lines.push(bout_matchup(bout, names));
        lines.push(bout_status(bout, names));
    }

    lines.join("\n")
}

/// Registration counter: `"3/8"`, or `"1 teams/4"` in 2v2
pub fn roster_counter(mode: Mode, roster_len: usize, capacity: usize) -> String {
    match mode {
        Mode::Solo => format!("{roster_len}/{capacity}"),
        Mode::Duo => format!("{} teams/{}", roster_len / 2, capacity / 2),
    }
}

/// `"1st"`, `"2nd"`, `"3rd"`, `"11th"`, ...
pub fn ordinal(rank: u8) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{rank}{suffix}")
}

pub fn medal(rank: u8) -> &'static str {
    match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        4 => "4️⃣",
        _ => "🏅",
    }
}

/// `"🥇 alice & bob"`
pub fn placement_line(placement: &Placement, names: &impl NameResolver) -> String {
    format!(
        "{} {}",
        medal(placement.rank),
        competitor_label(&placement.competitor, names)
    )
}

/// `"🥇 1st: 100 TP per player"`
pub fn prize_line(placement: &Placement) -> String {
    format!(
        "{} {}: {} TP per player",
        medal(placement.rank),
        ordinal(placement.rank),
        placement.reward
    )
}

/// Final announcement with rankings and prizes
pub fn completion_card(
    report: &CompletionReport,
    names: &impl NameResolver,
    finished_at: DateTime<Utc>,
) -> String {
    let mut lines = vec!["🏆 Tournament Winners!".to_string()];

    if let Some(champion) = report.placements.first() {
        lines.push(format!(
            "Congratulations to **{}** for winning the **{}** tournament! 🎉",
            competitor_label(&champion.competitor, names),
            report.metadata.title
        ));
    }

    lines.push(details_line(&report.metadata, report.mode));
    lines.push(String::new());
    lines.push("Final Rankings".to_string());
    lines.extend(
        report
            .placements
            .iter()
            .map(|placement| placement_line(placement, names)),
    );
    lines.push(String::new());
    lines.push("Prizes".to_string());
    lines.extend(report.placements.iter().map(prize_line));
    lines.push(String::new());
    lines.push(format!(
        "Tournament completed • {}",
        finished_at.format("%d.%m.%Y %H:%M")
    ));

    lines.join("\n")
}

/// Snapshot of where a tournament stands
pub fn standings(tournament: &Tournament, names: &impl NameResolver) -> String {
    let Some(format) = tournament.format() else {
        return "No tournament has been configured.".to_string();
    };
    let metadata = tournament.metadata();

    match tournament.current_round() {
        None => {
            let mut lines = vec![
                format!("🏆 {} ({})", metadata.title, format),
                format!(
                    "Registered: {}",
                    roster_counter(
                        format.mode,
                        tournament.roster().len(),
                        format.capacity.get()
                    )
                ),
            ];
            lines.extend(
                tournament
                    .roster()
                    .iter()
                    .map(|entrant| format!("• {}", names.display_name(entrant))),
            );
            lines.join("\n")
        }
        Some(round) => {
            let mut card = round_card(metadata, format.mode, round, names);
            if !tournament.eliminated().is_empty() {
                let eliminated = tournament
                    .eliminated()
                    .iter()
                    .map(|competitor| competitor_label(competitor, names))
                    .collect::<Vec<_>>()
                    .join(", ");
                card.push_str(&format!("\n\nEliminated: {eliminated}"));
            }
            card
        }
    }
}

fn details_line(metadata: &TournamentMetadata, mode: Mode) -> String {
    let mut parts = Vec::new();
    if !metadata.map.is_empty() {
        parts.push(format!("🗺️ Map: {}", metadata.map));
    }
    parts.push(format!("⚔️ Mode: {mode}"));
    if !metadata.abilities.is_empty() {
        parts.push(format!("✨ Abilities: {}", metadata.abilities));
    }
    if !metadata.prize.is_empty() {
        parts.push(format!("🎁 Prize: {}", metadata.prize));
    }
    parts.join(" | ")
}
