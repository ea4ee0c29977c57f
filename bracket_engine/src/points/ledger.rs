//! Tournament points balances per guild.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

use crate::tournament::{GuildId, Placement};

/// Tier derived from a member's points balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Wood,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Master,
    Champion,
}

impl Rank {
    pub fn from_points(points: u64) -> Self {
        match points {
            0..=300 => Rank::Wood,
            301..=600 => Rank::Bronze,
            601..=900 => Rank::Silver,
            901..=1200 => Rank::Gold,
            1201..=1500 => Rank::Platinum,
            1501..=1800 => Rank::Master,
            _ => Rank::Champion,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Rank::Wood => "Wood",
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Platinum => "Platinum",
            Rank::Master => "Master",
            Rank::Champion => "Champion",
        };
        write!(f, "{repr}")
    }
}

/// Points credited to one member for a placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub member: u64,
    pub rank: u8,
    pub points: u32,
    /// Balance after the award
    pub balance: u64,
}

/// Points balances keyed by guild, then member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsLedger {
    balances: HashMap<GuildId, HashMap<u64, u64>>,
}

impl PointsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit points to a member; returns the new balance
    pub fn award(&mut self, guild: GuildId, member: u64, points: u64) -> u64 {
        let balance = self
            .balances
            .entry(guild)
            .or_default()
            .entry(member)
            .or_default();
        *balance = balance.saturating_add(points);
        *balance
    }

    /// Credit every real member of every placed competitor.
    ///
    /// Each member of a team receives the full reward. Fillers are skipped,
    /// and so are placements without a reward.
    ///
    /// # Arguments
    ///
    /// * `guild` - Guild the tournament ran in
    /// * `placements` - Placements from the completion report
    ///
    /// # Returns
    ///
    /// * `Vec<Award>` - One entry per credited member
    pub fn award_placements(&mut self, guild: GuildId, placements: &[Placement]) -> Vec<Award> {
        let mut awards = Vec::new();
        for placement in placements.iter().filter(|p| p.reward > 0) {
            for member in placement.competitor.members() {
                let Some(member) = member.id().member_id() else {
                    continue;
                };
                let balance = self.award(guild, member, u64::from(placement.reward));
                awards.push(Award {
                    member,
                    rank: placement.rank,
                    points: placement.reward,
                    balance,
                });
            }
        }

        if !awards.is_empty() {
            log::info!(
                "Awarded points to {} members in guild {}",
                awards.len(),
                guild
            );
        }
        awards
    }

    pub fn balance(&self, guild: GuildId, member: u64) -> u64 {
        self.balances
            .get(&guild)
            .and_then(|members| members.get(&member))
            .copied()
            .unwrap_or(0)
    }

    pub fn rank(&self, guild: GuildId, member: u64) -> Rank {
        Rank::from_points(self.balance(guild, member))
    }

    /// Top balances, highest first; ties ordered by member id
    pub fn leaderboard(&self, guild: GuildId, limit: usize) -> Vec<(u64, u64)> {
        let mut entries: Vec<(u64, u64)> = self
            .balances
            .get(&guild)
            .map(|members| members.iter().map(|(&m, &p)| (m, p)).collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(limit);
        entries
    }

    /// Clear a guild's balances; returns whether there was anything to clear
    pub fn reset_guild(&mut self, guild: GuildId) -> bool {
        self.balances.remove(&guild).is_some()
    }
}
