use crate::error::{OddsError, OddsResult};
use crate::model::card::{CardEntry, DrawnCard};
use crate::model::category::Category;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub const MIN_DECK_SIZE: u32 = 40;
pub const MAX_DECK_SIZE: u32 = 60;
pub const MAX_COPIES: u32 = 3;

/// Immutable, normalized deck list.
///
/// Entry order is kept for display only; every probability query depends on
/// the category totals alone. A reload builds a new value instead of mutating
/// an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckModel {
    entries: Vec<CardEntry>,
}

impl DeckModel {
    pub fn new(entries: Vec<CardEntry>) -> OddsResult<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.id.as_str()) {
                return Err(OddsError::DuplicateCard(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Builds a deck and checks the copy sum against the size the loader declared.
    pub fn with_declared_size(entries: Vec<CardEntry>, declared: u32) -> OddsResult<Self> {
        let deck = Self::new(entries)?;
        let actual = deck.copy_sum();
        if actual != declared {
            return Err(OddsError::DeckSizeMismatch { declared, actual });
        }
        Ok(deck)
    }

    /// Builds an anonymous deck from category totals alone.
    ///
    /// Each total is split into entries of at most [`MAX_COPIES`] copies named
    /// `"<category>-<n>"`.
    pub fn from_category_totals(totals: &[(Category, u32)]) -> OddsResult<Self> {
        let mut entries = Vec::new();
        for (category, total) in totals {
            let mut remaining = *total;
            let mut index = 1;
            while remaining > 0 {
                let copies = remaining.min(MAX_COPIES);
                entries.push(CardEntry::new(
                    format!("{category}-{index}"),
                    category.clone(),
                    copies,
                )?);
                remaining -= copies;
                index += 1;
            }
        }
        Self::new(entries)
    }

    pub fn entries(&self) -> &[CardEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.copy_sum() == 0
    }

    /// Total number of card copies; an empty deck has no meaningful size.
    pub fn total_size(&self) -> OddsResult<u32> {
        match self.copy_sum() {
            0 => Err(OddsError::EmptyDeck),
            total => Ok(total),
        }
    }

    /// Copies tagged with `category`; an absent label simply counts zero.
    pub fn category_total(&self, category: &Category) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.is_in(category))
            .map(|entry| entry.copies)
            .sum()
    }

    pub fn categories(&self) -> BTreeSet<Category> {
        self.entries
            .iter()
            .map(|entry| entry.category.clone())
            .collect()
    }

    pub fn category_totals(&self) -> BTreeMap<Category, u32> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            *totals.entry(entry.category.clone()).or_insert(0) += entry.copies;
        }
        totals
    }

    /// Every physical copy in deck-list order.
    pub fn expanded(&self) -> Vec<DrawnCard<'_>> {
        self.entries
            .iter()
            .flat_map(|entry| (0..entry.copies).map(move |copy| DrawnCard::new(entry, copy)))
            .collect()
    }

    pub fn is_tournament_legal(&self) -> bool {
        (MIN_DECK_SIZE..=MAX_DECK_SIZE).contains(&self.copy_sum())
    }

    fn copy_sum(&self) -> u32 {
        self.entries.iter().map(|entry| entry.copies).sum()
    }
}
