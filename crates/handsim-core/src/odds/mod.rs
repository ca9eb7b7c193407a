//! Closed-form draw probabilities over a [`DeckModel`].
//!
//! - `binomial`: exact 128-bit binomial coefficients.
//! - `hypergeometric`: single-category distribution (`Hypergeometric`).
//! - `combined`: multi-category thresholds and exact splits.
//! - `cache`: bounded memo for combined queries.
//!
//! Categories missing from the deck count as zero copies everywhere; they are
//! never an error.

pub mod binomial;
mod cache;
mod combined;
mod hypergeometric;

pub use cache::OddsCache;
pub use combined::{
    CategoryCount, CategoryThreshold, CombinedQuery, probability_combined,
    probability_exact_split,
};
pub use hypergeometric::Hypergeometric;

pub(crate) use combined::checked_hand_size;

use crate::error::OddsResult;
use crate::model::category::Category;
use crate::model::deck::DeckModel;

/// Single-category distribution for `hand_size` draws from `deck`.
pub fn hypergeometric_for(
    deck: &DeckModel,
    category: &Category,
    hand_size: u32,
) -> OddsResult<Hypergeometric> {
    let population = deck.total_size()?;
    Hypergeometric::new(population, deck.category_total(category), hand_size)
}

/// P(at least `k` cards of `category` in a `hand_size` hand).
pub fn probability_at_least(
    deck: &DeckModel,
    category: &Category,
    k: u32,
    hand_size: u32,
) -> OddsResult<f64> {
    hypergeometric_for(deck, category, hand_size)?.at_least(k)
}

/// P(exactly `k` cards of `category` in a `hand_size` hand).
pub fn probability_exactly(
    deck: &DeckModel,
    category: &Category,
    k: u32,
    hand_size: u32,
) -> OddsResult<f64> {
    hypergeometric_for(deck, category, hand_size)?.pmf(k)
}

pub fn exact_distribution(
    deck: &DeckModel,
    category: &Category,
    hand_size: u32,
) -> OddsResult<Vec<f64>> {
    hypergeometric_for(deck, category, hand_size)?.distribution()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OddsError;

    fn forty_card_deck() -> DeckModel {
        DeckModel::from_category_totals(&[
            (Category::engine(), 12),
            (Category::handtrap(), 10),
            (Category::other(), 18),
        ])
        .unwrap()
    }

    #[test]
    fn at_least_one_engine() {
        let deck = forty_card_deck();
        let p = probability_at_least(&deck, &Category::engine(), 1, 5).unwrap();
        assert!((p - 0.8506).abs() < 1e-4);
    }

    #[test]
    fn missing_brick_category() {
        let deck = forty_card_deck();
        assert_eq!(
            probability_at_least(&deck, &Category::brick(), 1, 5).unwrap(),
            0.0
        );
        assert_eq!(
            probability_at_least(&deck, &Category::brick(), 0, 5).unwrap(),
            1.0
        );
        assert_eq!(
            probability_exactly(&deck, &Category::brick(), 0, 5).unwrap(),
            1.0
        );
    }

    #[test]
    fn whole_deck_hand_draws_every_copy() {
        let deck = forty_card_deck();
        for (category, total) in deck.category_totals() {
            assert_eq!(
                probability_at_least(&deck, &category, total, 40).unwrap(),
                1.0
            );
        }
    }

    #[test]
    fn oversized_hand_is_rejected() {
        let deck = forty_card_deck();
        assert!(matches!(
            probability_at_least(&deck, &Category::engine(), 1, 41),
            Err(OddsError::InvalidParameter {
                parameter: "hand_size",
                ..
            })
        ));
    }

    #[test]
    fn empty_deck_is_rejected() {
        let deck = DeckModel::new(Vec::new()).unwrap();
        assert_eq!(
            probability_at_least(&deck, &Category::engine(), 0, 0),
            Err(OddsError::EmptyDeck)
        );
    }

    #[test]
    fn zero_card_hand() {
        let deck = forty_card_deck();
        assert_eq!(
            exact_distribution(&deck, &Category::engine(), 0).unwrap(),
            vec![1.0]
        );
        assert_eq!(
            probability_at_least(&deck, &Category::engine(), 1, 0).unwrap(),
            0.0
        );
    }
}
