//! Hand sampling utilities operating on a deck snapshot.

use crate::error::OddsResult;
use crate::model::card::DrawnCard;
use crate::model::deck::DeckModel;
use crate::model::hand::HandSample;
use crate::odds::{CategoryThreshold, CombinedQuery};
use rand::Rng;
use rand::seq::{SliceRandom, index};
use serde::Serialize;
use tracing::{Level, event};

/// Draws hands uniformly without replacement.
///
/// Every subset of `hand_size` physical copies is equally likely. Randomness
/// always comes from the caller's generator, so a seeded generator reproduces
/// the same hands in the same order.
#[derive(Debug, Default)]
pub struct HandSampler;

impl HandSampler {
    pub fn sample_hand<'d, R: Rng + ?Sized>(
        deck: &'d DeckModel,
        hand_size: u32,
        rng: &mut R,
    ) -> OddsResult<HandSample<'d>> {
        crate::odds::checked_hand_size(deck, hand_size)?;
        let pool = deck.expanded();
        let cards: Vec<DrawnCard<'d>> = index::sample(rng, pool.len(), hand_size as usize)
            .into_iter()
            .map(|position| pool[position])
            .collect();

        event!(
            target: "handsim_core::sample",
            Level::TRACE,
            hand_size,
            pool = pool.len(),
            "sampled hand"
        );
        Ok(HandSample::with_cards(cards))
    }

    /// Draws one more card from the copies `hand` does not hold.
    ///
    /// Returns `None` once the deck is exhausted.
    pub fn draw_next<'d, R: Rng + ?Sized>(
        deck: &'d DeckModel,
        hand: &HandSample<'d>,
        rng: &mut R,
    ) -> OddsResult<Option<DrawnCard<'d>>> {
        deck.total_size()?;
        let remaining: Vec<DrawnCard<'d>> = deck
            .expanded()
            .into_iter()
            .filter(|card| !hand.contains(card))
            .collect();
        Ok(remaining.choose(rng).copied())
    }

    /// Samples `trials` hands and counts those meeting every threshold.
    pub fn simulate<R: Rng + ?Sized>(
        deck: &DeckModel,
        thresholds: &[CategoryThreshold],
        hand_size: u32,
        trials: u32,
        rng: &mut R,
    ) -> OddsResult<SimulationSummary> {
        // Same validation as the exact query so both paths reject the same input.
        CombinedQuery::resolve(deck, thresholds, hand_size)?;

        let mut summary = SimulationSummary { trials, hits: 0 };
        for _ in 0..trials {
            let hand = Self::sample_hand(deck, hand_size, rng)?;
            let satisfied = thresholds
                .iter()
                .all(|threshold| threshold.is_met_by(hand.count_in(&threshold.category)));
            if satisfied {
                summary.hits += 1;
            }
        }

        event!(
            target: "handsim_core::sample",
            Level::DEBUG,
            trials,
            hits = summary.hits,
            thresholds = thresholds.len(),
            "simulation finished"
        );
        Ok(summary)
    }
}

/// Hit counts from a Monte-Carlo run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub trials: u32,
    pub hits: u32,
}

impl SimulationSummary {
    pub fn frequency(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        f64::from(self.hits) / f64::from(self.trials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OddsError;
    use crate::model::card::CardEntry;
    use crate::model::category::Category;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn deck() -> DeckModel {
        DeckModel::from_category_totals(&[
            (Category::engine(), 12),
            (Category::handtrap(), 10),
            (Category::brick(), 3),
            (Category::other(), 15),
        ])
        .unwrap()
    }

    #[test]
    fn deterministic_with_fixed_seed() {
        let deck = deck();
        let mut rng_a = StdRng::seed_from_u64(123);
        let mut rng_b = StdRng::seed_from_u64(123);
        let hand_a = HandSampler::sample_hand(&deck, 5, &mut rng_a).unwrap();
        let hand_b = HandSampler::sample_hand(&deck, 5, &mut rng_b).unwrap();
        assert_eq!(hand_a, hand_b);
        assert_eq!(hand_a.len(), 5);
    }

    #[test]
    fn no_copy_is_drawn_twice() {
        let deck = deck();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let hand = HandSampler::sample_hand(&deck, 6, &mut rng).unwrap();
            let cards = hand.cards();
            for (i, a) in cards.iter().enumerate() {
                for b in &cards[i + 1..] {
                    assert_ne!(a, b, "copy drawn twice");
                }
            }
        }
    }

    #[test]
    fn every_copy_and_pair_is_equally_likely() {
        let deck = deck();
        let pool = deck.expanded();
        let trials = 20_000u32;
        let mut rng = StdRng::seed_from_u64(606);
        let mut singles = vec![0u32; pool.len()];
        let mut first_pair = 0u32;
        let mut cross_pair = 0u32;
        for _ in 0..trials {
            let hand = HandSampler::sample_hand(&deck, 5, &mut rng).unwrap();
            for (slot, card) in pool.iter().enumerate() {
                if hand.contains(card) {
                    singles[slot] += 1;
                }
            }
            // two copies of the first entry, then the first and last copies in the deck
            if hand.contains(&pool[0]) && hand.contains(&pool[1]) {
                first_pair += 1;
            }
            if hand.contains(&pool[0]) && hand.contains(&pool[pool.len() - 1]) {
                cross_pair += 1;
            }
        }

        let trials = f64::from(trials);
        let single = 5.0 / 40.0;
        for (slot, hits) in singles.iter().enumerate() {
            let frequency = f64::from(*hits) / trials;
            assert!(
                (frequency - single).abs() < 0.015,
                "copy {slot} drawn with frequency {frequency}"
            );
        }
        let pair = (5.0 * 4.0) / (40.0 * 39.0);
        assert!((f64::from(first_pair) / trials - pair).abs() < 0.004);
        assert!((f64::from(cross_pair) / trials - pair).abs() < 0.004);
    }

    #[test]
    fn zero_and_full_hands() {
        let deck = deck();
        let mut rng = StdRng::seed_from_u64(4);
        assert!(HandSampler::sample_hand(&deck, 0, &mut rng).unwrap().is_empty());

        let full = HandSampler::sample_hand(&deck, 40, &mut rng).unwrap();
        assert_eq!(full.len(), 40);
        assert_eq!(full.composition(), deck.category_totals());
    }

    #[test]
    fn oversized_and_empty_decks_fail() {
        let deck = deck();
        let mut rng = StdRng::seed_from_u64(4);
        assert!(matches!(
            HandSampler::sample_hand(&deck, 41, &mut rng),
            Err(OddsError::InvalidParameter { .. })
        ));
        let empty = DeckModel::new(Vec::new()).unwrap();
        assert_eq!(
            HandSampler::sample_hand(&empty, 0, &mut rng),
            Err(OddsError::EmptyDeck)
        );
    }

    #[test]
    fn draw_next_skips_held_copies() {
        let deck = DeckModel::new(vec![
            CardEntry::new("Jet Synchron", Category::engine(), 2).unwrap(),
            CardEntry::new("Ash Blossom", Category::handtrap(), 1).unwrap(),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(77);
        let hand = HandSampler::sample_hand(&deck, 2, &mut rng).unwrap();
        let next = HandSampler::draw_next(&deck, &hand, &mut rng)
            .unwrap()
            .expect("one card left");
        assert!(!hand.contains(&next));

        let full = HandSampler::sample_hand(&deck, 3, &mut rng).unwrap();
        assert!(HandSampler::draw_next(&deck, &full, &mut rng).unwrap().is_none());
    }

    #[test]
    fn simulation_tracks_exact_probability() {
        let deck = deck();
        let thresholds = [CategoryThreshold::new("engine", 1)];
        let mut rng = StdRng::seed_from_u64(2024);
        let summary = HandSampler::simulate(&deck, &thresholds, 5, 20_000, &mut rng).unwrap();
        assert_eq!(summary.trials, 20_000);
        // exact value is 0.8506; 20k trials keep the error well under 0.02
        assert!((summary.frequency() - 0.8506).abs() < 0.02);
    }

    #[test]
    fn empty_simulation_has_zero_frequency() {
        assert_eq!(SimulationSummary::default().frequency(), 0.0);
    }
}
