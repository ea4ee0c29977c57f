//! Bracket data models: entrants, teams, bouts, rounds and placements.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use super::errors::{BracketError, BracketResult};

/// Guild (server) identifier
pub type GuildId = u64;

/// Capacities a bracket can be configured with
pub const ALLOWED_CAPACITIES: [usize; 5] = [2, 4, 8, 16, 32];

/// Stable identity of an entrant.
///
/// Fillers live in their own namespace, so a filler id can never collide with
/// a member id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntrantId {
    /// Chat-platform member id
    Member(u64),
    /// Per-tournament filler ordinal
    Filler(u32),
}

impl EntrantId {
    /// Member id, if this is a real participant
    pub fn member_id(&self) -> Option<u64> {
        match self {
            EntrantId::Member(id) => Some(*id),
            EntrantId::Filler(_) => None,
        }
    }
}

impl fmt::Display for EntrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntrantId::Member(id) => write!(f, "{id}"),
            EntrantId::Filler(ordinal) => write!(f, "filler#{ordinal}"),
        }
    }
}

/// A real participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealEntrant {
    /// Chat-platform member id
    pub id: u64,
    /// Name at the time of registration
    pub display_name: String,
    /// Avatar reference, if the platform provides one
    pub avatar_url: Option<String>,
}

/// A generated placeholder used to fill a bracket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticEntrant {
    /// Ordinal from the tournament's filler counter
    pub ordinal: u32,
    /// Generated name
    pub name: String,
}

/// A single participant, real or synthetic.
///
/// Equality and hashing only look at the identity: names change with
/// nicknames and decorations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entrant {
    Real(RealEntrant),
    Synthetic(SyntheticEntrant),
}

impl Entrant {
    /// Create a real participant
    pub fn member(id: u64, display_name: impl Into<String>) -> Self {
        Entrant::Real(RealEntrant {
            id,
            display_name: display_name.into(),
            avatar_url: None,
        })
    }

    /// Create the filler with the given ordinal (`Bot<ordinal>`)
    pub fn filler(ordinal: u32) -> Self {
        Entrant::Synthetic(SyntheticEntrant {
            ordinal,
            name: format!("Bot{ordinal}"),
        })
    }

    /// Attach an avatar reference. Fillers have no avatar, so this is a no-op for them.
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        if let Entrant::Real(real) = &mut self {
            real.avatar_url = Some(url.into());
        }
        self
    }

    pub fn id(&self) -> EntrantId {
        match self {
            Entrant::Real(real) => EntrantId::Member(real.id),
            Entrant::Synthetic(filler) => EntrantId::Filler(filler.ordinal),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Entrant::Real(real) => &real.display_name,
            Entrant::Synthetic(filler) => &filler.name,
        }
    }

    pub fn avatar_url(&self) -> Option<&str> {
        match self {
            Entrant::Real(real) => real.avatar_url.as_deref(),
            Entrant::Synthetic(_) => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Entrant::Synthetic(_))
    }
}

impl PartialEq for Entrant {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Entrant {}

impl Hash for Entrant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Two distinct entrants competing jointly in 2v2 mode.
///
/// Member order carries no meaning: `(a, b)` equals `(b, a)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    members: [Entrant; 2],
}

impl Team {
    /// Pair two entrants. Returns `None` if both have the same identity.
    pub fn new(first: Entrant, second: Entrant) -> Option<Self> {
        if first.id() == second.id() {
            None
        } else {
            Some(Self {
                members: [first, second],
            })
        }
    }

    pub fn members(&self) -> &[Entrant; 2] {
        &self.members
    }

    pub fn ids(&self) -> [EntrantId; 2] {
        [self.members[0].id(), self.members[1].id()]
    }

    pub fn contains(&self, id: EntrantId) -> bool {
        self.members.iter().any(|member| member.id() == id)
    }

    /// The other member of the team
    pub fn partner_of(&self, id: EntrantId) -> Option<&Entrant> {
        match self.ids() {
            [first, _] if first == id => Some(&self.members[1]),
            [_, second] if second == id => Some(&self.members[0]),
            _ => None,
        }
    }

    /// True when both members are fillers
    pub fn is_synthetic(&self) -> bool {
        self.members.iter().all(Entrant::is_synthetic)
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        let [a, b] = self.ids();
        let [c, d] = other.ids();
        (a == c && b == d) || (a == d && b == c)
    }
}

impl Eq for Team {}

/// The unit that plays in a bout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Competitor {
    /// 1v1 mode
    Solo(Entrant),
    /// 2v2 mode
    Duo(Team),
}

impl Competitor {
    /// Membership test on identity; for teams either member matches
    pub fn contains(&self, id: EntrantId) -> bool {
        match self {
            Competitor::Solo(entrant) => entrant.id() == id,
            Competitor::Duo(team) => team.contains(id),
        }
    }

    pub fn members(&self) -> &[Entrant] {
        match self {
            Competitor::Solo(entrant) => std::slice::from_ref(entrant),
            Competitor::Duo(team) => team.members(),
        }
    }

    /// Identity of the first member, used in log lines
    pub fn lead_id(&self) -> EntrantId {
        self.members()[0].id()
    }

    pub fn is_synthetic(&self) -> bool {
        self.members().iter().all(Entrant::is_synthetic)
    }
}

/// Which half of a bout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// One match between two competitors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bout {
    pub home: Competitor,
    pub away: Competitor,
    winner: Option<Side>,
}

impl Bout {
    pub fn new(home: Competitor, away: Competitor) -> Self {
        Self {
            home,
            away,
            winner: None,
        }
    }

    pub fn competitor(&self, side: Side) -> &Competitor {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Side the entrant plays on, if they are in this bout
    pub fn side_of(&self, id: EntrantId) -> Option<Side> {
        if self.home.contains(id) {
            Some(Side::Home)
        } else if self.away.contains(id) {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn contains(&self, id: EntrantId) -> bool {
        self.side_of(id).is_some()
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner_side(&self) -> Option<Side> {
        self.winner
    }

    pub fn winner(&self) -> Option<&Competitor> {
        self.winner.map(|side| self.competitor(side))
    }

    pub fn loser(&self) -> Option<&Competitor> {
        self.winner.map(|side| self.competitor(side.opposite()))
    }

    /// Record the winning side. A decided bout never changes; returns false then.
    pub(crate) fn decide(&mut self, side: Side) -> bool {
        if self.winner.is_some() {
            return false;
        }
        self.winner = Some(side);
        true
    }
}

/// One full layer of bouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Round number (1-indexed)
    pub number: u32,
    pub bouts: Vec<Bout>,
}

impl Round {
    /// Pair consecutive competitors: `(c[0], c[1]), (c[2], c[3]), ...`
    ///
    /// The field must have an even length.
    pub fn pair(number: u32, field: Vec<Competitor>) -> BracketResult<Self> {
        if field.len() % 2 != 0 {
            log::error!(
                "Round {} generated from an odd field of {} competitors",
                number,
                field.len()
            );
            return Err(BracketError::InternalState(format!(
                "round {number} has an odd field of {}",
                field.len()
            )));
        }

        let mut bouts = Vec::with_capacity(field.len() / 2);
        let mut competitors = field.into_iter();
        while let (Some(home), Some(away)) = (competitors.next(), competitors.next()) {
            bouts.push(Bout::new(home, away));
        }

        Ok(Self { number, bouts })
    }

    pub fn is_complete(&self) -> bool {
        self.bouts.iter().all(Bout::is_decided)
    }

    pub fn undecided_count(&self) -> usize {
        self.bouts.iter().filter(|bout| !bout.is_decided()).count()
    }

    /// All competitors in bout order
    pub fn competitors(&self) -> impl Iterator<Item = &Competitor> {
        self.bouts.iter().flat_map(|bout| [&bout.home, &bout.away])
    }
}

/// Bracket mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "1v1")]
    Solo,
    #[serde(rename = "2v2")]
    Duo,
}

impl Mode {
    /// Entrants per competitor
    pub fn team_size(&self) -> usize {
        match self {
            Mode::Solo => 1,
            Mode::Duo => 2,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Solo => write!(f, "1v1"),
            Mode::Duo => write!(f, "2v2"),
        }
    }
}

impl FromStr for Mode {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1v1" => Ok(Mode::Solo),
            "2v2" => Ok(Mode::Duo),
            other => Err(BracketError::InvalidConfiguration(format!(
                "unknown mode '{other}' (expected 1v1 or 2v2)"
            ))),
        }
    }
}

/// Number of entrant slots, one of [`ALLOWED_CAPACITIES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Capacity(usize);

impl Capacity {
    pub fn new(slots: usize) -> BracketResult<Self> {
        if ALLOWED_CAPACITIES.contains(&slots) {
            Ok(Self(slots))
        } else {
            Err(BracketError::InvalidConfiguration(format!(
                "capacity {slots} is not one of {ALLOWED_CAPACITIES:?}"
            )))
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for Capacity {
    type Error = BracketError;

    fn try_from(slots: usize) -> Result<Self, Self::Error> {
        Self::new(slots)
    }
}

impl From<Capacity> for usize {
    fn from(capacity: Capacity) -> Self {
        capacity.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated mode + capacity combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub mode: Mode,
    pub capacity: Capacity,
}

impl Format {
    /// Validate a mode and capacity.
    ///
    /// A 2v2 bracket needs room for at least two teams.
    pub fn new(mode: Mode, capacity: usize) -> BracketResult<Self> {
        let capacity = Capacity::new(capacity)?;
        if mode == Mode::Duo && capacity.get() < 4 {
            return Err(BracketError::InvalidConfiguration(format!(
                "2v2 needs at least 4 slots, got {capacity}"
            )));
        }
        Ok(Self { mode, capacity })
    }

    /// Maximum number of competitors (entrants in 1v1, teams in 2v2)
    pub fn max_competitors(&self) -> usize {
        self.capacity.get() / self.mode.team_size()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.capacity)
    }
}

/// Parses the `"<mode> <capacity>"` form, e.g. `"2v2 8"`
impl FromStr for Format {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(mode), Some(capacity), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BracketError::InvalidConfiguration(format!(
                "expected '<mode> <capacity>', got '{}'",
                s.trim()
            )));
        };

        let capacity = capacity.parse::<usize>().map_err(|_| {
            BracketError::InvalidConfiguration(format!("capacity '{capacity}' is not a number"))
        })?;

        Self::new(mode.parse()?, capacity)
    }
}

/// Display-only tournament details. The engine never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentMetadata {
    pub title: String,
    pub map: String,
    pub abilities: String,
    pub prize: String,
}

impl TournamentMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Tournament lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentState {
    #[default]
    Unconfigured,
    Configured,
    Active,
    Complete,
}

impl fmt::Display for TournamentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            TournamentState::Unconfigured => "unconfigured",
            TournamentState::Configured => "configured",
            TournamentState::Active => "active",
            TournamentState::Complete => "complete",
        };
        write!(f, "{repr}")
    }
}

/// Points awarded per placement (index 0 is 1st place)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable {
    pub rewards: Vec<u32>,
}

impl RewardTable {
    pub fn new(rewards: Vec<u32>) -> Self {
        Self { rewards }
    }

    /// Reward for a 1-indexed rank; 0 outside the table
    pub fn reward_for(&self, rank: u8) -> u32 {
        match rank {
            0 => 0,
            rank => self
                .rewards
                .get(usize::from(rank) - 1)
                .copied()
                .unwrap_or(0),
        }
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self::new(vec![100, 70, 50, 50])
    }
}

/// Parses a comma-separated list, e.g. `"100,70,50,50"`
impl FromStr for RewardTable {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rewards = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>().map_err(|_| {
                    BracketError::InvalidConfiguration(format!("reward '{part}' is not a number"))
                })
            })
            .collect::<BracketResult<Vec<_>>>()?;

        if rewards.is_empty() {
            return Err(BracketError::InvalidConfiguration(
                "reward table is empty".to_string(),
            ));
        }

        Ok(Self::new(rewards))
    }
}

/// A ranked finisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// 1-indexed rank
    pub rank: u8,
    pub competitor: Competitor,
    /// Points per player
    pub reward: u32,
}
