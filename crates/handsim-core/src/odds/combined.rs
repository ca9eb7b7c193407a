//! Multivariate hypergeometric queries over several categories at once.

use super::binomial::binomial;
use super::hypergeometric::ratio;
use crate::error::{OddsError, OddsResult};
use crate::model::category::Category;
use crate::model::deck::DeckModel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Requirement that a hand holds at least `minimum` cards of `category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryThreshold {
    pub category: Category,
    pub minimum: u32,
}

impl CategoryThreshold {
    pub fn new(category: impl Into<Category>, minimum: u32) -> Self {
        Self {
            category: category.into(),
            minimum,
        }
    }

    pub fn is_met_by(&self, held: u32) -> bool {
        held >= self.minimum
    }
}

/// Requirement that a hand holds exactly `count` cards of `category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: u32,
}

impl CategoryCount {
    pub fn new(category: impl Into<Category>, count: u32) -> Self {
        Self {
            category: category.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Group {
    copies: u32,
    minimum: u32,
}

/// A combined query reduced to the numbers that determine its answer.
///
/// Two queries against decks with the same category totals resolve to equal
/// values, which is what makes this usable as a memo key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinedQuery {
    population: u32,
    hand_size: u32,
    groups: Vec<Group>,
}

impl CombinedQuery {
    pub fn resolve(
        deck: &DeckModel,
        thresholds: &[CategoryThreshold],
        hand_size: u32,
    ) -> OddsResult<Self> {
        let population = checked_hand_size(deck, hand_size)?;
        ensure_distinct(thresholds.iter().map(|threshold| &threshold.category))?;

        let mut groups: Vec<Group> = thresholds
            .iter()
            .map(|threshold| Group {
                copies: deck.category_total(&threshold.category),
                minimum: threshold.minimum,
            })
            .collect();
        groups.sort_unstable();

        Ok(Self {
            population,
            hand_size,
            groups,
        })
    }

    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn hand_size(&self) -> u32 {
        self.hand_size
    }

    /// Sums the multivariate PMF over every split meeting all minimums.
    ///
    /// `ways[j]` counts the selections of `j` cards from the listed categories
    /// that satisfy every minimum processed so far; the remaining `n − j` cards
    /// come from the unlisted remainder. Cost is O(groups · n²).
    pub fn evaluate(&self) -> OddsResult<f64> {
        let required: u64 = self.groups.iter().map(|g| u64::from(g.minimum)).sum();
        if required > u64::from(self.hand_size) {
            return Ok(0.0);
        }
        if self.groups.iter().any(|g| g.minimum > g.copies) {
            return Ok(0.0);
        }

        let denominator = self.binomial(self.population, self.hand_size)?;
        let slots = self.hand_size as usize + 1;
        let mut ways = vec![0u128; slots];
        ways[0] = 1;
        let mut listed = 0u32;

        for group in &self.groups {
            let mut next = vec![0u128; slots];
            for (drawn, &count) in ways.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let room = self.hand_size - drawn as u32;
                for take in group.minimum..=group.copies.min(room) {
                    let term = count
                        .checked_mul(self.binomial(group.copies, take)?)
                        .ok_or(self.overflow())?;
                    let slot = &mut next[drawn + take as usize];
                    *slot = slot.checked_add(term).ok_or(self.overflow())?;
                }
            }
            ways = next;
            listed += group.copies;
        }

        let rest = self.population - listed;
        let mut favourable: u128 = 0;
        for (drawn, &count) in ways.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let from_rest = self.binomial(rest, self.hand_size - drawn as u32)?;
            let term = count.checked_mul(from_rest).ok_or(self.overflow())?;
            favourable = favourable.checked_add(term).ok_or(self.overflow())?;
        }

        Ok(ratio(favourable, denominator))
    }

    fn binomial(&self, n: u32, k: u32) -> OddsResult<u128> {
        binomial(n, k).ok_or(self.overflow())
    }

    fn overflow(&self) -> OddsError {
        OddsError::Overflow {
            population: self.population,
            draws: self.hand_size,
        }
    }
}

/// Probability that every threshold holds in the same hand.
///
/// Thresholds whose minimums add up past the hand size can never hold together
/// and yield zero; an empty list is trivially satisfied.
pub fn probability_combined(
    deck: &DeckModel,
    thresholds: &[CategoryThreshold],
    hand_size: u32,
) -> OddsResult<f64> {
    CombinedQuery::resolve(deck, thresholds, hand_size)?.evaluate()
}

/// Probability of holding exactly the listed count of each listed category,
/// with the rest of the hand drawn from every other card.
pub fn probability_exact_split(
    deck: &DeckModel,
    counts: &[CategoryCount],
    hand_size: u32,
) -> OddsResult<f64> {
    let population = checked_hand_size(deck, hand_size)?;
    ensure_distinct(counts.iter().map(|count| &count.category))?;
    let overflow = || OddsError::Overflow {
        population,
        draws: hand_size,
    };

    let held: u64 = counts.iter().map(|c| u64::from(c.count)).sum();
    if held > u64::from(hand_size) {
        return Ok(0.0);
    }

    let mut favourable: u128 = 1;
    let mut listed = 0u32;
    for count in counts {
        let copies = deck.category_total(&count.category);
        let ways = binomial(copies, count.count).ok_or_else(overflow)?;
        favourable = favourable.checked_mul(ways).ok_or_else(overflow)?;
        listed += copies;
    }
    let rest = binomial(population - listed, hand_size - held as u32).ok_or_else(overflow)?;
    favourable = favourable.checked_mul(rest).ok_or_else(overflow)?;
    let denominator = binomial(population, hand_size).ok_or_else(overflow)?;

    Ok(ratio(favourable, denominator))
}

pub(crate) fn checked_hand_size(deck: &DeckModel, hand_size: u32) -> OddsResult<u32> {
    let population = deck.total_size()?;
    if hand_size > population {
        return Err(OddsError::invalid(
            "hand_size",
            format!("{hand_size} exceeds deck size {population}"),
        ));
    }
    Ok(population)
}

fn ensure_distinct<'a>(categories: impl Iterator<Item = &'a Category>) -> OddsResult<()> {
    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category) {
            return Err(OddsError::invalid(
                "thresholds",
                format!("category '{category}' is listed more than once"),
            ));
        }
    }
    Ok(())
}
