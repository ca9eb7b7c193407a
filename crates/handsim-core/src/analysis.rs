//! Opening-hand tables built from the closed-form queries.
//!
//! Everything here returns plain numbers; rendering belongs to the caller.

use crate::error::{OddsError, OddsResult};
use crate::model::category::Category;
use crate::model::deck::DeckModel;
use crate::model::hand::HandSample;
use crate::odds::{self, CategoryCount};
use serde::Serialize;

/// Exact and at-least tables for one category, indexed by copies in hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOdds {
    pub category: Category,
    pub total: u32,
    /// Mean copies in hand.
    pub expected: f64,
    pub exactly: Vec<f64>,
    pub at_least: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsReport {
    pub deck_size: u32,
    pub hand_size: u32,
    pub categories: Vec<CategoryOdds>,
}

impl OddsReport {
    pub fn build(deck: &DeckModel, categories: &[Category], hand_size: u32) -> OddsResult<Self> {
        let deck_size = deck.total_size()?;
        let mut rows = Vec::with_capacity(categories.len());
        for category in categories {
            let dist = odds::hypergeometric_for(deck, category, hand_size)?;
            let at_least = (0..=hand_size)
                .map(|k| dist.at_least(k))
                .collect::<OddsResult<Vec<_>>>()?;
            rows.push(CategoryOdds {
                category: category.clone(),
                total: dist.successes(),
                expected: dist.mean(),
                exactly: dist.distribution()?,
                at_least,
            });
        }
        Ok(Self {
            deck_size,
            hand_size,
            categories: rows,
        })
    }

    pub fn category(&self, category: &Category) -> Option<&CategoryOdds> {
        self.categories.iter().find(|row| &row.category == category)
    }
}

/// Grid of P(exactly `i` of `row` and exactly `j` of `column`).
///
/// The grid is `(hand_size + 1)²`; cells with `i + j > hand_size` are zero.
pub fn composition_matrix(
    deck: &DeckModel,
    row: &Category,
    column: &Category,
    hand_size: u32,
) -> OddsResult<Vec<Vec<f64>>> {
    if row == column {
        return Err(OddsError::invalid(
            "matrix",
            format!("row and column are both '{row}'"),
        ));
    }
    let mut grid = Vec::with_capacity(hand_size as usize + 1);
    for i in 0..=hand_size {
        let mut cells = Vec::with_capacity(hand_size as usize + 1);
        for j in 0..=hand_size {
            let cell = if i + j > hand_size {
                0.0
            } else {
                odds::probability_exact_split(
                    deck,
                    &[
                        CategoryCount::new(row.clone(), i),
                        CategoryCount::new(column.clone(), j),
                    ],
                    hand_size,
                )?
            };
            cells.push(cell);
        }
        grid.push(cells);
    }
    Ok(grid)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextDrawCategory {
    pub category: Category,
    pub remaining: u32,
    pub probability: f64,
}

/// Odds for the card drawn after `hand` (the going-second draw).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextDrawOdds {
    pub remaining: u32,
    pub categories: Vec<NextDrawCategory>,
}

pub fn next_draw_odds(
    deck: &DeckModel,
    hand: &HandSample<'_>,
    categories: &[Category],
) -> OddsResult<NextDrawOdds> {
    let deck_size = deck.total_size()?;
    let held = hand.len() as u32;
    if held > deck_size {
        return Err(OddsError::invalid(
            "hand",
            format!("{held} cards held from a {deck_size}-card deck"),
        ));
    }
    let remaining = deck_size - held;

    let categories = categories
        .iter()
        .map(|category| {
            let left = deck
                .category_total(category)
                .saturating_sub(hand.count_in(category));
            let probability = if remaining == 0 {
                0.0
            } else {
                f64::from(left) / f64::from(remaining)
            };
            NextDrawCategory {
                category: category.clone(),
                remaining: left,
                probability,
            }
        })
        .collect();

    Ok(NextDrawOdds {
        remaining,
        categories,
    })
}

/// How likely an unwanted category shows up by the opening hand or the next draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrickAnalysis {
    /// P(at least one in the opening hand).
    pub open_with: f64,
    /// P(next draw is one | none in the opening hand).
    pub next_draw_given_none: f64,
    /// P(at least one among the opening hand plus the next draw).
    pub by_next_draw: f64,
}

pub fn brick_analysis(
    deck: &DeckModel,
    category: &Category,
    hand_size: u32,
) -> OddsResult<BrickAnalysis> {
    let dist = odds::hypergeometric_for(deck, category, hand_size)?;
    let open_with = dist.at_least(1)?;
    let none_open = dist.pmf(0)?;
    let left = dist.population() - hand_size;
    let next_draw_given_none = if left == 0 {
        0.0
    } else {
        f64::from(dist.successes()) / f64::from(left)
    };

    Ok(BrickAnalysis {
        open_with,
        next_draw_given_none,
        by_next_draw: open_with + none_open * next_draw_given_none,
    })
}
