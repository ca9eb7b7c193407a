use handsim_core::analysis::{OddsReport, brick_analysis, composition_matrix, next_draw_odds};
use handsim_core::model::category::Category;
use handsim_core::model::deck::DeckModel;
use handsim_core::sample::HandSampler;
use handsim_core::{OddsError, ProbabilityEngine};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{DeckLoadError, QueryConfig, SimulatorConfig};
use crate::report::{
    BrickReport, DeckSummary, MatrixReport, QueryResult, RunReport, SampledHand, SimulationCheck,
};

/// Seed used when the configuration leaves `simulation.seed` unset.
pub const DEFAULT_SEED: u64 = 0x5EED_0040;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Deck(#[from] DeckLoadError),
    #[error(transparent)]
    Odds(#[from] OddsError),
}

pub struct SimulationRunner {
    config: SimulatorConfig,
    deck: DeckModel,
    engine: ProbabilityEngine,
}

impl SimulationRunner {
    /// Load the deck and check that a hand of the configured size fits in it.
    pub fn new(config: SimulatorConfig) -> Result<Self, RunError> {
        let deck = config.deck.load()?;
        let size = deck.total_size()?;
        if config.hand_size > size {
            return Err(OddsError::InvalidParameter {
                parameter: "hand_size",
                message: format!("{} exceeds deck size {size}", config.hand_size),
            }
            .into());
        }
        Ok(Self {
            config,
            deck,
            engine: ProbabilityEngine::new(),
        })
    }

    pub fn deck(&self) -> &DeckModel {
        &self.deck
    }

    pub fn run(mut self) -> Result<RunReport, RunError> {
        let hand_size = self.config.hand_size;
        let seed = self.config.simulation.seed.unwrap_or(DEFAULT_SEED);
        let mut rng = StdRng::seed_from_u64(seed);
        let deck_size = self.deck.total_size()?;

        event!(
            target: "handsim::run",
            Level::INFO,
            run_id = %self.config.run_id,
            deck_size,
            hand_size,
            seed,
            "run started"
        );

        let categories: Vec<Category> = if self.config.report.categories.is_empty() {
            self.deck.categories().into_iter().collect()
        } else {
            self.config.report.categories.clone()
        };

        let mut queries = Vec::with_capacity(self.config.queries.len());
        for query in &self.config.queries {
            let probability = match query {
                QueryConfig::AtLeast { category, count } => {
                    self.engine.at_least(&self.deck, category, *count, hand_size)?
                }
                QueryConfig::Exactly { category, count } => {
                    self.engine.exactly(&self.deck, category, *count, hand_size)?
                }
                QueryConfig::Combined { .. } => {
                    let thresholds = query.thresholds().unwrap_or_default();
                    self.engine.combined(&self.deck, &thresholds, hand_size)?
                }
            };

            let trials = self.config.simulation.trials;
            let simulation = match query.thresholds() {
                Some(thresholds) if trials > 0 => {
                    let summary =
                        HandSampler::simulate(&self.deck, &thresholds, hand_size, trials, &mut rng)?;
                    Some(SimulationCheck::compare(summary, probability))
                }
                _ => None,
            };

            let label = query.label();
            event!(
                target: "handsim::run",
                Level::INFO,
                query = %label,
                probability,
                simulated = simulation.map(|check| check.frequency),
                "query answered"
            );
            queries.push(QueryResult {
                label,
                probability,
                simulation,
            });
        }

        let odds = OddsReport::build(&self.deck, &categories, hand_size)?;

        let matrix = match &self.config.report.matrix {
            Some(axes) => Some(MatrixReport {
                row: axes.row.clone(),
                column: axes.column.clone(),
                cells: composition_matrix(&self.deck, &axes.row, &axes.column, hand_size)?,
            }),
            None => None,
        };

        let brick_category = &self.config.report.brick;
        let brick = BrickReport {
            category: brick_category.clone(),
            copies: self.deck.category_total(brick_category),
            analysis: brick_analysis(&self.deck, brick_category, hand_size)?,
        };

        let mut sample_hands = Vec::new();
        for _ in 0..self.config.simulation.sample_hands {
            let hand = self.engine.sample_hand(&self.deck, hand_size, &mut rng)?;
            let next = HandSampler::draw_next(&self.deck, &hand, &mut rng)?;
            let next_odds = next_draw_odds(&self.deck, &hand, &categories)?;
            event!(
                target: "handsim::run",
                Level::DEBUG,
                cards = ?hand.ids(),
                next = next.map(|card| card.id()),
                "sample hand drawn"
            );
            sample_hands.push(SampledHand::new(&hand, next, next_odds));
        }

        let stats = self.engine.cache_stats();
        Ok(RunReport {
            run_id: self.config.run_id,
            seed,
            deck: DeckSummary::from_deck(&self.deck, deck_size),
            hand_size,
            queries,
            odds,
            matrix,
            brick,
            sample_hands,
            cache_hits: stats.hits,
            cache_misses: stats.misses,
        })
    }
}
