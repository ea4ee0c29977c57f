//! Final placements from the elimination history.

use super::models::{Competitor, Placement, RewardTable};

/// Number of ranked finishers
pub const RANKED_PLACES: usize = 4;

/// Compute placements for a finished bracket.
///
/// Rank 1 is the champion. Ranks 2..=4 walk the elimination history backwards:
/// the grand-final loser, then whoever went out just before. Fewer than four
/// placements are returned for small brackets.
///
/// # Arguments
///
/// * `champion` - Winner of the final bout
/// * `eliminated` - Losers in elimination order, most recent last
/// * `rewards` - Points per rank
///
/// # Returns
///
/// * `Vec<Placement>` - Placements ordered by rank
pub fn compute_placements(
    champion: &Competitor,
    eliminated: &[Competitor],
    rewards: &RewardTable,
) -> Vec<Placement> {
    let runners_up = eliminated.iter().rev().take(RANKED_PLACES - 1);

    std::iter::once(champion)
        .chain(runners_up)
        .zip(1u8..)
        .map(|(competitor, rank)| Placement {
            rank,
            competitor: competitor.clone(),
            reward: rewards.reward_for(rank),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::Entrant;

    fn solo(id: u64) -> Competitor {
        Competitor::Solo(Entrant::member(id, format!("p{id}")))
    }

    #[test]
    fn test_eight_player_ranks() {
        // Quarterfinal losers 5..8, semifinal losers 3 and 4, final loser 2
        let eliminated = vec![solo(5), solo(6), solo(7), solo(8), solo(3), solo(4), solo(2)];
        let placements = compute_placements(&solo(1), &eliminated, &RewardTable::default());

        let ranked: Vec<(u8, Competitor, u32)> = placements
            .into_iter()
            .map(|p| (p.rank, p.competitor, p.reward))
            .collect();
        assert_eq!(
            ranked,
            vec![
                (1, solo(1), 100),
                (2, solo(2), 70),
                (3, solo(4), 50),
                (4, solo(3), 50),
            ]
        );
    }

    #[test]
    fn test_two_player_bracket() {
        let placements = compute_placements(&solo(1), &[solo(2)], &RewardTable::default());
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].competitor, solo(2));
    }

    #[test]
    fn test_custom_rewards_beyond_table() {
        let rewards = RewardTable::new(vec![10]);
        let placements = compute_placements(&solo(1), &[solo(2), solo(3)], &rewards);
        assert_eq!(placements[0].reward, 10);
        assert_eq!(placements[1].reward, 0);
        assert_eq!(placements[2].reward, 0);
    }
}
