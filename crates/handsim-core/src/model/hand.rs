use crate::model::card::DrawnCard;
use crate::model::category::Category;
use std::collections::BTreeMap;

/// Cards drawn for one simulated hand, in draw order.
///
/// Borrows the deck it was drawn from and has no identity beyond the call
/// that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandSample<'a> {
    cards: Vec<DrawnCard<'a>>,
}

impl<'a> HandSample<'a> {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<DrawnCard<'a>>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[DrawnCard<'a>] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawnCard<'a>> {
        self.cards.iter()
    }

    pub fn contains(&self, card: &DrawnCard<'_>) -> bool {
        self.cards
            .iter()
            .any(|held| std::ptr::eq(held.entry, card.entry) && held.copy == card.copy)
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.cards.iter().map(|card| card.id()).collect()
    }

    pub fn count_in(&self, category: &Category) -> u32 {
        self.cards
            .iter()
            .filter(|card| card.category() == category)
            .count() as u32
    }

    /// Cards held per category; categories absent from the hand are omitted.
    pub fn composition(&self) -> BTreeMap<Category, u32> {
        let mut counts = BTreeMap::new();
        for card in &self.cards {
            *counts.entry(card.category().clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::HandSample;
    use crate::model::card::{CardEntry, DrawnCard};
    use crate::model::category::Category;

    #[test]
    fn counts_cards_per_category() {
        let starter = CardEntry::new("Diabellstar", Category::engine(), 3).unwrap();
        let trap = CardEntry::new("Infinite Impermanence", Category::handtrap(), 3).unwrap();
        let hand = HandSample::with_cards(vec![
            DrawnCard::new(&starter, 0),
            DrawnCard::new(&trap, 2),
            DrawnCard::new(&starter, 1),
        ]);

        assert_eq!(hand.len(), 3);
        assert_eq!(hand.count_in(&Category::engine()), 2);
        assert_eq!(hand.count_in(&Category::brick()), 0);
        assert_eq!(hand.composition()[&Category::handtrap()], 1);
        assert_eq!(
            hand.ids(),
            vec!["Diabellstar", "Infinite Impermanence", "Diabellstar"]
        );
        assert!(hand.contains(&DrawnCard::new(&trap, 2)));
        assert!(!hand.contains(&DrawnCard::new(&trap, 0)));
    }

    #[test]
    fn empty_hand() {
        let hand = HandSample::new();
        assert!(hand.is_empty());
        assert!(hand.composition().is_empty());
    }
}
