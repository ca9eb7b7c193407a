use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use handsim_core::analysis::{BrickAnalysis, NextDrawOdds, OddsReport};
use handsim_core::model::card::DrawnCard;
use handsim_core::model::category::Category;
use handsim_core::model::deck::DeckModel;
use handsim_core::model::hand::HandSample;
use handsim_core::sample::SimulationSummary;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub seed: u64,
    pub deck: DeckSummary,
    pub hand_size: u32,
    pub queries: Vec<QueryResult>,
    pub odds: OddsReport,
    pub matrix: Option<MatrixReport>,
    pub brick: BrickReport,
    pub sample_hands: Vec<SampledHand>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckSummary {
    pub size: u32,
    pub tournament_legal: bool,
    pub categories: BTreeMap<Category, u32>,
}

impl DeckSummary {
    pub fn from_deck(deck: &DeckModel, size: u32) -> Self {
        Self {
            size,
            tournament_legal: deck.is_tournament_legal(),
            categories: deck.category_totals(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub label: String,
    pub probability: f64,
    pub simulation: Option<SimulationCheck>,
}

/// Monte-Carlo estimate of a query next to its exact value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationCheck {
    pub trials: u32,
    pub hits: u32,
    pub frequency: f64,
    pub ci95: (f64, f64),
    /// Two-sided p-value of the observed frequency under the exact probability.
    pub p_value: f64,
    pub within_interval: bool,
}

impl SimulationCheck {
    pub fn compare(summary: SimulationSummary, exact: f64) -> Self {
        let frequency = summary.frequency();
        let ci95 = proportion_interval(frequency, summary.trials);
        Self {
            trials: summary.trials,
            hits: summary.hits,
            frequency,
            ci95,
            p_value: p_value(frequency, exact, summary.trials),
            within_interval: exact >= ci95.0 && exact <= ci95.1,
        }
    }
}

fn proportion_interval(frequency: f64, trials: u32) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    let std_error = (frequency * (1.0 - frequency) / f64::from(trials)).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    ((frequency - margin).max(0.0), (frequency + margin).min(1.0))
}

fn p_value(frequency: f64, exact: f64, trials: u32) -> f64 {
    if trials == 0 {
        return 1.0;
    }
    let variance = exact * (1.0 - exact) / f64::from(trials);
    if variance <= 0.0 {
        // Certain or impossible events can only be matched exactly.
        return if (frequency - exact).abs() < f64::EPSILON {
            1.0
        } else {
            0.0
        };
    }
    let z = (frequency - exact).abs() / variance.sqrt();
    match Normal::new(0.0, 1.0) {
        Ok(normal) => (2.0 * (1.0 - normal.cdf(z))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub row: Category,
    pub column: Category,
    /// `cells[i][j]` = P(exactly i of `row` and j of `column`).
    pub cells: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrickReport {
    pub category: Category,
    pub copies: u32,
    #[serde(flatten)]
    pub analysis: BrickAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampledCard {
    pub id: String,
    pub category: Category,
    pub copy: u32,
}

impl From<&DrawnCard<'_>> for SampledCard {
    fn from(card: &DrawnCard<'_>) -> Self {
        Self {
            id: card.id().to_string(),
            category: card.category().clone(),
            copy: card.copy,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampledHand {
    pub cards: Vec<SampledCard>,
    pub composition: BTreeMap<Category, u32>,
    pub next_draw: Option<SampledCard>,
    pub next_draw_odds: NextDrawOdds,
}

impl SampledHand {
    pub fn new(
        hand: &HandSample<'_>,
        next_draw: Option<DrawnCard<'_>>,
        next_draw_odds: NextDrawOdds,
    ) -> Self {
        Self {
            cards: hand.iter().map(SampledCard::from).collect(),
            composition: hand.composition(),
            next_draw: next_draw.as_ref().map(SampledCard::from),
            next_draw_odds,
        }
    }
}

impl RunReport {
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: impl AsRef<Path>, json: bool) -> Result<(), ReportError> {
        let body = if json {
            self.to_json()?
        } else {
            self.render_text()
        };
        fs::write(path.as_ref(), body).map_err(|source| ReportError::Io {
            context: "writing report",
            source,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Opening Hands: {}\n\n", self.run_id));
        out.push_str(&format!(
            "{size}-card deck ({legal}), {hand}-card hands, seed {seed}\n\n",
            size = self.deck.size,
            legal = if self.deck.tournament_legal {
                "tournament legal"
            } else {
                "outside 40-60 cards"
            },
            hand = self.hand_size,
            seed = self.seed,
        ));

        out.push_str("| Category | Copies |\n");
        out.push_str("|----------|--------|\n");
        for (category, copies) in &self.deck.categories {
            out.push_str(&format!("| {category} | {copies} |\n"));
        }

        if !self.queries.is_empty() {
            out.push_str("\n## Queries\n\n");
            out.push_str("| Query | Exact | Simulated | 95% CI | p-value |\n");
            out.push_str("|-------|-------|-----------|--------|---------|\n");
            for query in &self.queries {
                match &query.simulation {
                    Some(sim) => out.push_str(&format!(
                        "| {label} | {exact} | {freq} ({hits}/{trials}) | [{low}, {high}] | {pval:.3} |\n",
                        label = query.label,
                        exact = percent(query.probability),
                        freq = percent(sim.frequency),
                        hits = sim.hits,
                        trials = sim.trials,
                        low = percent(sim.ci95.0),
                        high = percent(sim.ci95.1),
                        pval = sim.p_value,
                    )),
                    None => out.push_str(&format!(
                        "| {} | {} | - | - | - |\n",
                        query.label,
                        percent(query.probability)
                    )),
                }
            }
        }

        out.push_str("\n## Copies in opening hand\n\n");
        out.push_str(&self.odds_table());

        if let Some(matrix) = &self.matrix {
            out.push_str(&format!(
                "\n## {} (rows) x {} (columns)\n\n",
                matrix.row, matrix.column
            ));
            out.push_str(&matrix_table(matrix));
        }

        out.push_str(&format!(
            "\n## Bricks ({}, {} copies)\n\n",
            self.brick.category, self.brick.copies
        ));
        out.push_str(&format!(
            "- In opening hand: {}\n- Next draw, given none opened: {}\n- By the next draw: {}\n",
            percent(self.brick.analysis.open_with),
            percent(self.brick.analysis.next_draw_given_none),
            percent(self.brick.analysis.by_next_draw),
        ));

        if !self.sample_hands.is_empty() {
            out.push_str("\n## Sample hands\n\n");
            for (index, hand) in self.sample_hands.iter().enumerate() {
                let cards = hand
                    .cards
                    .iter()
                    .map(|card| format!("{} [{}]", card.id, card.category))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("{}. {cards}\n", index + 1));
                if let Some(next) = &hand.next_draw {
                    out.push_str(&format!("   next draw: {} [{}]", next.id, next.category));
                    let odds = hand
                        .next_draw_odds
                        .categories
                        .iter()
                        .map(|c| format!("{} {}", c.category, percent(c.probability)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    out.push_str(&format!(" (odds: {odds})\n"));
                }
            }
        }

        out
    }

    fn odds_table(&self) -> String {
        let mut rows = String::new();
        let counts = 0..=self.odds.hand_size;
        rows.push_str("| Category | Copies | Expected |");
        for k in counts.clone() {
            rows.push_str(&format!(" ={k} | >={k} |"));
        }
        rows.push('\n');
        rows.push_str("|----------|--------|----------|");
        for _ in counts {
            rows.push_str("-----|------|");
        }
        rows.push('\n');

        for row in &self.odds.categories {
            rows.push_str(&format!(
                "| {} | {} | {:.2} |",
                row.category, row.total, row.expected
            ));
            for (exactly, at_least) in row.exactly.iter().zip(&row.at_least) {
                rows.push_str(&format!(" {} | {} |", percent(*exactly), percent(*at_least)));
            }
            rows.push('\n');
        }
        rows
    }
}

fn matrix_table(matrix: &MatrixReport) -> String {
    let mut rows = String::new();
    rows.push_str("|   |");
    for j in 0..matrix.cells.len() {
        rows.push_str(&format!(" {j} |"));
    }
    rows.push('\n');
    rows.push_str("|---|");
    for _ in 0..matrix.cells.len() {
        rows.push_str("---|");
    }
    rows.push('\n');
    for (i, cells) in matrix.cells.iter().enumerate() {
        rows.push_str(&format!("| {i} |"));
        for cell in cells {
            rows.push_str(&format!(" {} |", percent(*cell)));
        }
        rows.push('\n');
    }
    rows
}

fn percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_contains_matching_estimate() {
        let check = SimulationCheck::compare(
            SimulationSummary {
                trials: 10_000,
                hits: 8_500,
            },
            0.8506,
        );
        assert!(check.within_interval);
        assert!(check.ci95.0 < 0.85 && check.ci95.1 > 0.85);
        assert!(check.p_value > 0.5);
    }

    #[test]
    fn far_estimate_has_small_p_value() {
        let check = SimulationCheck::compare(
            SimulationSummary {
                trials: 10_000,
                hits: 7_000,
            },
            0.8506,
        );
        assert!(!check.within_interval);
        assert!(check.p_value < 1e-6);
    }

    #[test]
    fn certain_events_match_only_exactly() {
        let hit = SimulationCheck::compare(SimulationSummary { trials: 50, hits: 50 }, 1.0);
        assert_eq!(hit.p_value, 1.0);
        assert_eq!(hit.ci95, (1.0, 1.0));
        assert!(hit.within_interval);

        let miss = SimulationCheck::compare(SimulationSummary { trials: 50, hits: 0 }, 1.0);
        assert_eq!(miss.p_value, 0.0);
    }

    #[test]
    fn empty_simulation_is_neutral() {
        let check = SimulationCheck::compare(SimulationSummary::default(), 0.3);
        assert_eq!(check.ci95, (0.0, 0.0));
        assert_eq!(check.p_value, 1.0);
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(percent(0.850_594), "85.06%");
        assert_eq!(percent(1.0), "100.00%");
    }
}
